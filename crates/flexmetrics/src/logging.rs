//! `tracing` subscriber setup for binaries embedding the server.
//!
//! The library itself only emits `tracing` events; installing a subscriber is
//! left to the host. [`init_logging`] is a ready-made one with JSON or pretty
//! output and an `EnvFilter`.
//!
//! # Example
//!
//! ```rust,ignore
//! use flexmetrics::logging::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::from_env())?;
//! tracing::info!("starting");
//! ```

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::error::LoggingError;

/// Environment variable holding the filter directive.
pub const ENV_LOG_LEVEL: &str = "FLEXMETRICS_LOG";

/// Environment variable selecting the output format (`json` or `pretty`).
pub const ENV_LOG_FORMAT: &str = "FLEXMETRICS_LOG_FORMAT";

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Filter directive (e.g. `info`, `flexmetrics=debug,hyper=warn`).
    pub level: String,

    /// Whether to output JSON.
    pub json_format: bool,

    /// Whether to include file/line info.
    pub file_line_info: bool,

    /// Whether to include the target (module path).
    pub include_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: true,
            file_line_info: false,
            include_target: true,
        }
    }
}

impl LogConfig {
    /// Human-readable output at debug level.
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            json_format: false,
            file_line_info: true,
            ..Self::default()
        }
    }

    /// JSON output at info level.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }

    /// Production defaults overridden by [`ENV_LOG_LEVEL`] and
    /// [`ENV_LOG_FORMAT`].
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::production();
        if let Ok(level) = std::env::var(ENV_LOG_LEVEL) {
            config.apply_env_var(ENV_LOG_LEVEL, &level);
        }
        if let Ok(format) = std::env::var(ENV_LOG_FORMAT) {
            config.apply_env_var(ENV_LOG_FORMAT, &format);
        }
        config
    }

    fn apply_env_var(&mut self, key: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        match key {
            ENV_LOG_LEVEL => self.level = value.to_string(),
            ENV_LOG_FORMAT => match value.to_ascii_lowercase().as_str() {
                "json" => self.json_format = true,
                "pretty" | "text" => self.json_format = false,
                other => tracing::warn!(format = other, "unknown log format, keeping default"),
            },
            _ => {}
        }
    }
}

/// Installs the global `tracing` subscriber described by `config`.
pub fn init_logging(config: &LogConfig) -> Result<(), LoggingError> {
    if !config.enabled {
        return Ok(());
    }

    let filter = create_env_filter(&config.level)?;

    if config.json_format {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_target(config.include_target)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| LoggingError::Init(e.to_string()))
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_target(config.include_target)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| LoggingError::Init(e.to_string()))
    }
}

/// Parses a filter directive.
pub fn create_env_filter(filter: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(filter).map_err(|e| LoggingError::InvalidFilter(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert!(config.enabled);
        assert!(config.json_format);
        assert_eq!(config.level, "info");
    }

    #[test]
    fn test_development_config() {
        let config = LogConfig::development();
        assert!(!config.json_format);
        assert!(config.file_line_info);
        assert_eq!(config.level, "debug");
    }

    #[test]
    fn test_apply_env_var() {
        let mut config = LogConfig::production();
        config.apply_env_var(ENV_LOG_LEVEL, "flexmetrics=debug");
        config.apply_env_var(ENV_LOG_FORMAT, "PRETTY");
        assert_eq!(config.level, "flexmetrics=debug");
        assert!(!config.json_format);

        config.apply_env_var(ENV_LOG_LEVEL, "   ");
        config.apply_env_var(ENV_LOG_FORMAT, "xml");
        assert_eq!(config.level, "flexmetrics=debug");
        assert!(!config.json_format);
    }

    #[test]
    fn test_create_env_filter() {
        assert!(create_env_filter("info").is_ok());
        assert!(create_env_filter("flexmetrics=debug,hyper=warn").is_ok());
    }

    #[test]
    fn test_disabled_logging() {
        let config = LogConfig {
            enabled: false,
            ..LogConfig::default()
        };
        assert!(init_logging(&config).is_ok());
    }
}
