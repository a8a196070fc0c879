//! Logging configuration
//!
//! Console output goes to stderr so stdout only ever carries the printed
//! object. An optional JSON log file can be added alongside.

use anyhow::Result;
use std::io;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_NAME: &str = "kubepost.log";

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file_path: None,
        }
    }
}

impl LoggingConfig {
    /// Combine the configured level with `-v` flags
    pub fn new(configured_level: &str, verbosity: u8, file_path: Option<String>) -> Self {
        Self {
            level: level_for(configured_level, verbosity).to_string(),
            file_path,
        }
    }

    /// Install the global subscriber; keep the returned guard alive until exit
    pub fn init(&self) -> Result<Option<WorkerGuard>> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        let console_layer = fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_ansi(true)
            .with_writer(io::stderr);

        let guard = if let Some(ref path) = self.file_path {
            let (writer, guard) = non_blocking(rolling::never(path, LOG_FILE_NAME));

            let file_layer = fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_ansi(false)
                .json()
                .with_writer(writer);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(console_layer)
                .with(file_layer)
                .try_init()?;

            Some(guard)
        } else {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(console_layer)
                .try_init()?;

            None
        };

        tracing::debug!(level = %self.level, "Logging initialized");

        Ok(guard)
    }
}

/// `-v` raises the level to info, `-vv` to debug, `-vvv` to trace
fn level_for(configured: &str, verbosity: u8) -> &str {
    match verbosity {
        0 => configured,
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_overrides_configured_level() {
        assert_eq!(LoggingConfig::new("error", 0, None).level, "error");
        assert_eq!(LoggingConfig::new("error", 1, None).level, "info");
        assert_eq!(LoggingConfig::new("warn", 2, None).level, "debug");
        assert_eq!(LoggingConfig::new("warn", 7, None).level, "trace");
    }

    #[test]
    fn test_default_level() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "warn");
        assert!(config.file_path.is_none());
    }
}
