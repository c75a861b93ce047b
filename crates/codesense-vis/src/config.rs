//! Environment configuration.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use codesense_trace::DEFAULT_MAX_CODE_LENGTH;

use crate::error::ConfigError;
use crate::playback::DEFAULT_INTERVAL;
use crate::status::DEFAULT_STATUS_TTL;

/// Session and server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisConfig {
    /// Base URL of the trace generator.
    pub generator_url: String,
    pub listen_addr: SocketAddr,
    /// Initial auto-advance interval.
    pub interval: Duration,
    pub status_ttl: Duration,
    pub max_code_length: usize,
}

impl Default for VisConfig {
    fn default() -> Self {
        Self {
            generator_url: "http://localhost:8000".to_string(),
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            interval: DEFAULT_INTERVAL,
            status_ttl: DEFAULT_STATUS_TTL,
            max_code_length: DEFAULT_MAX_CODE_LENGTH,
        }
    }
}

impl VisConfig {
    /// Create config from environment variables with sensible defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Create config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let generator_url = lookup("CODESENSE_GENERATOR_URL").unwrap_or(defaults.generator_url);
        if !generator_url.starts_with("http://") && !generator_url.starts_with("https://") {
            return Err(ConfigError {
                var: "CODESENSE_GENERATOR_URL",
                value: generator_url,
                reason: "expected an http(s) URL".to_string(),
            });
        }

        let listen_addr = parse(&lookup, "CODESENSE_LISTEN_ADDR")?.unwrap_or(defaults.listen_addr);
        let interval = millis(&lookup, "CODESENSE_INTERVAL_MS")?.unwrap_or(defaults.interval);
        let status_ttl = millis(&lookup, "CODESENSE_STATUS_TTL_MS")?.unwrap_or(defaults.status_ttl);
        let max_code_length =
            parse(&lookup, "CODESENSE_MAX_CODE_LENGTH")?.unwrap_or(defaults.max_code_length);

        Ok(Self {
            generator_url,
            listen_addr,
            interval,
            status_ttl,
            max_code_length,
        })
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.listen_addr.set_port(port);
        self
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(value) = lookup(var) else {
        return Ok(None);
    };
    match value.trim().parse() {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => Err(ConfigError {
            var,
            reason: e.to_string(),
            value,
        }),
    }
}

fn millis(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<Duration>, ConfigError> {
    match parse::<u64>(lookup, var)? {
        Some(0) => Err(ConfigError {
            var,
            value: "0".to_string(),
            reason: "must be greater than zero".to_string(),
        }),
        ms => Ok(ms.map(Duration::from_millis)),
    }
}
