//! Logging initialization.
//!
//! The library only emits `tracing` events; installing a subscriber is the
//! binary's job, through here.

use tracing_subscriber::EnvFilter;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// Newline-delimited JSON.
    Json,
}

impl LogFormat {
    /// Parses a format string, falling back to pretty output.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Installs the global tracing subscriber.
///
/// The filter comes from `DECKWISE_LOG` (falling back to `RUST_LOG`
/// semantics via `EnvFilter`), defaulting to `info`; `verbose` lowers the
/// default to `debug`. Repeated initialization is ignored so tests can call
/// this freely.
pub fn init_logging(format: LogFormat, verbose: bool) {
    let default_directive = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("DECKWISE_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let result = match format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
    };

    if let Err(e) = result {
        tracing::debug!("Logging already initialized: {e}");
    }
}
