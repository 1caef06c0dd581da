//! Defaults, environment snapshot and declarative configuration.
//!
//! Resolution precedence, lowest to highest:
//!
//! 1. Built-in defaults ([`DEFAULT_ADDR`], [`DEFAULT_PATH`])
//! 2. `METRICS_ADDR` / `METRICS_PROMETHEUS_PATH`, when non-empty
//! 3. Options, applied left to right
//!
//! # Example
//!
//! ```rust
//! use flexmetrics::config::{EnvSnapshot, ENV_ADDR};
//! use flexmetrics::Server;
//!
//! let env = EnvSnapshot::from_pairs([(ENV_ADDR, "127.0.0.1:1111")]);
//! let server = Server::from_env(&env, Vec::new());
//! assert_eq!(server.addr(), "127.0.0.1:1111");
//! assert_eq!(server.path(), "/metrics");
//! ```

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::options::{self, Opt};

/// Default bind address.
pub const DEFAULT_ADDR: &str = "0.0.0.0:9090";

/// Default path for the Prometheus exposition.
pub const DEFAULT_PATH: &str = "/metrics";

/// Default read timeout of the embedded HTTP server.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Default read-header timeout of the embedded HTTP server.
pub const DEFAULT_READ_HEADER_TIMEOUT: Duration = Duration::from_secs(1);

/// Default idle timeout of the embedded HTTP server.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(1);

/// Default write timeout of the embedded HTTP server.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(15);

/// Environment variable overriding the bind address.
pub const ENV_ADDR: &str = "METRICS_ADDR";

/// Environment variable overriding the metrics path.
pub const ENV_PATH: &str = "METRICS_PROMETHEUS_PATH";

/// A snapshot of the environment variables the resolver reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    /// Captures [`ENV_ADDR`] and [`ENV_PATH`] from the process environment.
    pub fn from_process() -> Self {
        let vars = [ENV_ADDR, ENV_PATH]
            .into_iter()
            .filter_map(|key| std::env::var(key).ok().map(|value| (key.to_string(), value)))
            .collect();
        Self { vars }
    }

    /// Builds a snapshot from explicit key/value pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Returns the value of `key` if it is set and non-empty.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// The bind address from the environment, or [`DEFAULT_ADDR`].
    pub fn addr(&self) -> &str {
        self.get(ENV_ADDR).unwrap_or(DEFAULT_ADDR)
    }

    /// The metrics path from the environment, or [`DEFAULT_PATH`].
    pub fn path(&self) -> &str {
        self.get(ENV_PATH).unwrap_or(DEFAULT_PATH)
    }
}

/// Normalizes a metrics path.
///
/// Surrounding whitespace is trimmed, an empty path falls back to
/// [`DEFAULT_PATH`] and a missing leading `/` is prepended. Dot segments are
/// kept as given.
///
/// ```rust
/// use flexmetrics::config::normalize_path;
///
/// assert_eq!(normalize_path("prom"), "/prom");
/// assert_eq!(normalize_path("/prom"), "/prom");
/// assert_eq!(normalize_path(""), "/metrics");
/// ```
pub fn normalize_path(path: &str) -> String {
    let path = path.trim();
    if path.is_empty() {
        DEFAULT_PATH.to_string()
    } else if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// Declarative form of the option set, for hosts that keep settings in a
/// config file.
///
/// Unset fields contribute no option, so the environment and defaults still
/// apply to them.
///
/// ```rust
/// use flexmetrics::config::MetricsConfig;
/// use flexmetrics::Server;
///
/// let config = MetricsConfig {
///     path: Some("/prom".to_string()),
///     ..MetricsConfig::default()
/// };
/// let server = Server::new(config.into_options());
/// assert_eq!(server.path(), "/prom");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetricsConfig {
    /// Path for the Prometheus exposition.
    pub path: Option<String>,

    /// Bind address (`host:port`).
    pub addr: Option<String>,

    /// Read timeout in seconds.
    pub read_timeout_secs: Option<u64>,

    /// Read-header timeout in seconds.
    pub read_header_timeout_secs: Option<u64>,

    /// Idle (keep-alive) timeout in seconds.
    pub idle_timeout_secs: Option<u64>,

    /// Write timeout in seconds.
    pub write_timeout_secs: Option<u64>,
}

impl MetricsConfig {
    /// Converts the configuration into an ordered option list.
    pub fn into_options(self) -> Vec<Opt> {
        let secs = |value: Option<u64>| value.map(Duration::from_secs);
        let mut opts = Vec::new();

        if let Some(addr) = self.addr {
            opts.push(options::with_addr(addr));
        }
        if let Some(path) = self.path {
            opts.push(options::with_path(path));
        }
        if let Some(timeout) = secs(self.read_timeout_secs) {
            opts.push(options::with_read_timeout(timeout));
        }
        if let Some(timeout) = secs(self.read_header_timeout_secs) {
            opts.push(options::with_read_header_timeout(timeout));
        }
        if let Some(timeout) = secs(self.idle_timeout_secs) {
            opts.push(options::with_idle_timeout(timeout));
        }
        if let Some(timeout) = secs(self.write_timeout_secs) {
            opts.push(options::with_write_timeout(timeout));
        }

        opts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_env_snapshot_defaults() {
        let env = EnvSnapshot::default();
        assert_eq!(env.addr(), DEFAULT_ADDR);
        assert_eq!(env.path(), DEFAULT_PATH);
    }

    #[test]
    fn test_env_snapshot_values() {
        let env = EnvSnapshot::from_pairs([(ENV_ADDR, "0.0.0.0:1111"), (ENV_PATH, "/testmetrics")]);
        assert_eq!(env.addr(), "0.0.0.0:1111");
        assert_eq!(env.path(), "/testmetrics");
    }

    #[test]
    fn test_env_snapshot_ignores_empty_values() {
        let env = EnvSnapshot::from_pairs([(ENV_ADDR, ""), (ENV_PATH, "")]);
        assert_eq!(env.addr(), DEFAULT_ADDR);
        assert_eq!(env.path(), DEFAULT_PATH);
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/metrics"), "/metrics");
        assert_eq!(normalize_path("metrics"), "/metrics");
        assert_eq!(normalize_path("  /zero  "), "/zero");
        assert_eq!(normalize_path("   "), DEFAULT_PATH);
        assert_eq!(normalize_path("/a/../b"), "/a/../b");
    }

    #[test]
    fn test_metrics_config_deserialize() {
        let config: MetricsConfig = serde_json::from_str(
            r#"{"path": "/prom", "addr": "127.0.0.1:0", "write_timeout_secs": 30}"#,
        )
        .unwrap();

        assert_eq!(config.path.as_deref(), Some("/prom"));
        assert_eq!(config.addr.as_deref(), Some("127.0.0.1:0"));
        assert_eq!(config.write_timeout_secs, Some(30));
        assert_eq!(config.into_options().len(), 3);
    }

    #[test]
    fn test_metrics_config_rejects_unknown_fields() {
        let result: Result<MetricsConfig, _> = serde_json::from_str(r#"{"port": 9090}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_metrics_config_empty_yields_no_options() {
        assert!(MetricsConfig::default().into_options().is_empty());
    }

    proptest! {
        #[test]
        fn prop_normalized_path_is_rooted(path in ".*") {
            let normalized = normalize_path(&path);
            prop_assert!(!normalized.is_empty());
            prop_assert!(normalized.starts_with('/'));
        }
    }
}
