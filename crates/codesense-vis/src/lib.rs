//! CodeSense Visualization
//!
//! Step-by-step playback of execution traces with a web API.
//!
//! # Architecture
//!
//! - **Playback**: pure controller state machine over one trace
//! - **Player**: tokio task driving the controller with a single interval timer
//! - **Client**: HTTP client for the external trace generator
//! - **Session**: player, renderer registry, generator and status line together
//! - **Server**: REST API for playback and rendering, WebSocket frame stream
//!
//! # Usage
//!
//! ```ignore
//! let config = VisConfig::from_env()?;
//! let session = Session::from_config(&config)?;
//!
//! let server = VisServer::new(session);
//! server.serve(config.listen_addr).await?;
//! ```

mod client;
mod config;
mod error;
mod playback;
mod player;
mod server;
mod session;
mod status;

pub use client::{GeneratorClient, TraceSource, REQUEST_TIMEOUT};
pub use config::VisConfig;
pub use error::{ClientError, ConfigError, Error, PlaybackError, Result};
pub use playback::{
    Playback, PlaybackState, PlaybackStatus, StepOutcome, TickOutcome, TimerToken,
    DEFAULT_INTERVAL,
};
pub use player::{PlaybackEvent, Player, Snapshot};
pub use server::{ErrorResponse, StatusResponse, StepResponse, VisServer};
pub use session::{Frame, Session, COMPLETED_MESSAGE};
pub use status::{StatusKind, StatusLine, StatusMessage, DEFAULT_STATUS_TTL};
