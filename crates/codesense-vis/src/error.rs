//! Error types for the visualization session.

use codesense_trace::{InputError, TraceError};
use thiserror::Error;

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Rejected playback commands. The controller state is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// Nothing loaded yet
    #[error("no steps to play; generate a visualization first")]
    NoSteps,

    /// Zero tick interval
    #[error("playback interval must be greater than zero")]
    InvalidInterval,
}

/// Failures talking to the trace generator.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Non-success response; `message` is the server's `detail` when present
    #[error("{message}")]
    Server { status: u16, message: String },

    /// Connection, timeout or body read failure
    #[error("could not reach the trace generator: {0}")]
    Transport(#[from] reqwest::Error),

    /// Success response that does not decode
    #[error("invalid generator response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Success response whose steps are inconsistent
    #[error("invalid trace: {0}")]
    Trace(#[from] TraceError),
}

/// Invalid environment configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {var}={value:?}: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

/// Anything a session operation can fail with.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Trace(#[from] TraceError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The player task has shut down
    #[error("playback has stopped")]
    PlayerStopped,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
