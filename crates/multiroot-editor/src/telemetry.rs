//! Console logging for applications embedding the editor.
//!
//! # Usage
//!
//! ```ignore
//! use multiroot_editor::telemetry::{self, TelemetryConfig};
//!
//! telemetry::init(TelemetryConfig::from_env());
//! tracing::info!("editor starting");
//! ```

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer};

/// Telemetry configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Console log level (default: INFO, DEBUG in debug builds)
    pub console_level: Level,
    /// Include the event target in console output.
    pub with_target: bool,
}

impl TelemetryConfig {
    /// Load config from environment variables.
    ///
    /// - `RUST_LOG`: Standard env filter (optional, overrides console_level)
    pub fn from_env() -> Self {
        let console_level = if cfg!(debug_assertions) {
            Level::DEBUG
        } else {
            Level::INFO
        };

        Self {
            console_level,
            with_target: true,
        }
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.console_level.as_str().to_lowercase()))
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Install the console subscriber, failing if one is already installed.
pub fn try_init(config: TelemetryConfig) -> Result<(), TryInitError> {
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(config.with_target)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .with_filter(config.env_filter());

    tracing_subscriber::registry().with(console_layer).try_init()
}

/// Install the console subscriber. Call once at application startup.
pub fn init(config: TelemetryConfig) {
    if let Err(err) = try_init(config) {
        tracing::warn!(error = %err, "tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        let _ = try_init(TelemetryConfig::from_env());
        assert!(try_init(TelemetryConfig::from_env()).is_err());
    }

    #[test]
    fn test_default_level_follows_build() {
        let config = TelemetryConfig::from_env();
        if cfg!(debug_assertions) {
            assert_eq!(config.console_level, Level::DEBUG);
        } else {
            assert_eq!(config.console_level, Level::INFO);
        }
    }
}
