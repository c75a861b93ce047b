//! Short-lived status messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Default lifetime of a status message.
pub const DEFAULT_STATUS_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

/// The single status line of a session.
///
/// A message disappears once it is older than the TTL; expiry is checked
/// when the line is read, so nothing has to run in the background.
#[derive(Debug)]
pub struct StatusLine {
    ttl: Duration,
    current: Option<(StatusMessage, Instant)>,
    posted: u64,
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::new(DEFAULT_STATUS_TTL)
    }
}

impl StatusLine {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            current: None,
            posted: 0,
        }
    }

    /// Replace the current message.
    pub fn post(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.current = Some((
            StatusMessage {
                kind,
                text: text.into(),
            },
            Instant::now(),
        ));
        self.posted += 1;
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.post(StatusKind::Info, text);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.post(StatusKind::Error, text);
    }

    /// The message, unless it has expired.
    pub fn current(&self) -> Option<&StatusMessage> {
        self.current
            .as_ref()
            .filter(|(_, posted_at)| posted_at.elapsed() < self.ttl)
            .map(|(message, _)| message)
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// How many messages were ever posted.
    pub fn posted(&self) -> u64 {
        self.posted
    }
}
