//! Telemetry module for logging setup
//!
//! Provides unified logging configuration built on `tracing-subscriber`.

use std::env;
use tracing_subscriber::EnvFilter;

/// Telemetry configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Primary log filter (RUST_LOG env var)
    pub log_filter: String,
    /// Fallback log level if RUST_LOG is not set
    pub default_level: String,
}

impl TelemetryConfig {
    /// Resolve the filter: `RUST_LOG`, else `LOG_LEVEL`, else `level`.
    pub fn with_level(level: &str) -> Self {
        Self {
            log_filter: env::var("RUST_LOG").unwrap_or_default(),
            default_level: env::var("LOG_LEVEL").unwrap_or_else(|_| level.to_string()),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self::with_level("info")
    }
}

/// Initialize the global tracing subscriber.
///
/// Safe to call multiple times - will only initialize once.
pub fn init_logging(config: &TelemetryConfig) {
    if tracing::dispatcher::has_been_set() {
        tracing::debug!("tracing subscriber already initialized, skipping");
        return;
    }

    let filter = if config.log_filter.is_empty() {
        EnvFilter::new(&config.default_level)
    } else {
        EnvFilter::new(&config.log_filter)
    };

    // try_init to avoid panicking if another thread set the subscriber
    // between the has_been_set() check and now
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .try_init();
}
