//! Error types for codesense-trace.

use thiserror::Error;

/// Result type for trace store operations.
pub type Result<T> = std::result::Result<T, TraceError>;

/// Errors raised by the trace store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceError {
    /// Lookup on a store that holds no steps.
    #[error("trace is empty")]
    OutOfRange,

    /// A step carried an index that does not match its position.
    #[error("step at position {expected} declares index {found}")]
    IndexMismatch { expected: usize, found: usize },
}

/// Request rejected before it reaches the trace generator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// Code was empty or whitespace only.
    #[error("please enter some code first")]
    EmptyCode,

    /// Code exceeds the configured maximum length.
    #[error("code is too long ({len} characters, maximum is {max})")]
    TooLong { len: usize, max: usize },
}
