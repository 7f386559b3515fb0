//! Settings for the HTTP client behind [`HttpTransport`](super::HttpTransport).

use std::{ops::RangeInclusive, time::Duration};

use serde::Deserialize;

use crate::error::{GatewayError, Result};

const TIMEOUT_RANGE: RangeInclusive<u64> = 1..=300;
const CONNECT_TIMEOUT_RANGE: RangeInclusive<u64> = 1..=60;

/// Connection pool, deadlines and protocol for gateway calls.
///
/// Read from the `[http]` table of the gateway configuration. Missing keys
/// take their defaults:
///
/// ```toml
/// [http]
/// pool_max_idle_per_host = 100
/// timeout_secs = 30
/// connect_timeout_secs = 10
/// http_version = "auto"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Idle keep-alive connections kept per gateway host.
    pub pool_max_idle_per_host: usize,
    /// Deadline for a whole call when the caller sets none.
    pub timeout_secs: u64,
    /// Deadline for establishing a connection.
    pub connect_timeout_secs: u64,
    /// Protocol selection.
    pub http_version: HttpVersion,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            pool_max_idle_per_host: 100,
            timeout_secs: 30,
            connect_timeout_secs: 10,
            http_version: HttpVersion::Auto,
        }
    }
}

impl HttpConfig {
    /// Checks that both timeouts are in range (1-300s overall, 1-60s connect).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] naming the offending key.
    pub fn validate(&self) -> Result<()> {
        check_range("timeout_secs", self.timeout_secs, &TIMEOUT_RANGE)?;
        check_range("connect_timeout_secs", self.connect_timeout_secs, &CONNECT_TIMEOUT_RANGE)
    }

    /// Default call deadline.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Connect deadline.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

fn check_range(key: &str, value: u64, range: &RangeInclusive<u64>) -> Result<()> {
    if range.contains(&value) {
        return Ok(());
    }
    Err(GatewayError::Config(format!(
        "http.{key} must be between {} and {} seconds, got {value}",
        range.start(),
        range.end()
    )))
}

/// Which HTTP protocol to speak.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HttpVersion {
    /// HTTP/1.1 only.
    Http1,
    /// HTTP/2 with prior knowledge.
    Http2,
    /// Negotiated through TLS ALPN.
    #[default]
    Auto,
}
