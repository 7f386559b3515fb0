//! Structured logging for the CLI.
//!
//! Logs go to stderr so that stdout carries only the JSON result.

use std::io;

use clap::ValueEnum;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable output.
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Reads the format from `LOG_FORMAT`; anything but `json` is pretty.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_setting(std::env::var("LOG_FORMAT").ok().as_deref())
    }

    fn from_setting(value: Option<&str>) -> Self {
        match value.map(str::to_lowercase).as_deref() {
            Some("json") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Installs the global subscriber.
///
/// The level filter comes from `RUST_LOG` and defaults to `info`. Request spans
/// are logged when they close, which records each gateway call's duration.
pub fn init_observability(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => {
            subscriber
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_span_events(FmtSpan::CLOSE)
                        .with_writer(io::stderr),
                )
                .init();
        }
        LogFormat::Json => {
            subscriber
                .with(
                    fmt::layer()
                        .json()
                        .with_current_span(true)
                        .with_span_list(true)
                        .with_target(true)
                        .with_span_events(FmtSpan::CLOSE)
                        .with_writer(io::stderr),
                )
                .init();
        }
    }
}
