//! Resolution against the real process environment.
//!
//! Each test sets or clears `METRICS_ADDR` / `METRICS_PROMETHEUS_PATH` with
//! `temp_env`, which serializes access to the environment.

use std::time::Duration;

use flexmetrics::config::{ENV_ADDR, ENV_PATH};
use flexmetrics::options::{with_addr, with_path, with_read_header_timeout, with_server};
use flexmetrics::{EnvSnapshot, HttpServer, Server};

fn with_test_env<R>(f: impl FnOnce() -> R) -> R {
    temp_env::with_vars(
        [
            (ENV_ADDR, Some("0.0.0.0:1111")),
            (ENV_PATH, Some("/testmetrics")),
        ],
        f,
    )
}

#[test]
fn defaults_without_env_or_options() {
    temp_env::with_vars_unset([ENV_ADDR, ENV_PATH], || {
        let server = Server::new(Vec::new());
        assert_eq!(server.addr(), "0.0.0.0:9090");
        assert_eq!(server.path(), "/metrics");
    });
}

#[test]
fn empty_env_values_are_ignored() {
    temp_env::with_vars([(ENV_ADDR, Some("")), (ENV_PATH, Some(""))], || {
        let server = Server::new(Vec::new());
        assert_eq!(server.addr(), "0.0.0.0:9090");
        assert_eq!(server.path(), "/metrics");
    });
}

#[test]
fn env_only() {
    with_test_env(|| {
        let server = Server::new(Vec::new());
        assert_eq!(server.addr(), "0.0.0.0:1111");
        assert_eq!(server.path(), "/testmetrics");
    });
}

#[test]
fn option_overrides_env_addr() {
    with_test_env(|| {
        let server = Server::new(vec![with_addr("0.0.0.0:2222")]);
        assert_eq!(server.addr(), "0.0.0.0:2222");
        assert_eq!(server.path(), "/testmetrics");
    });
}

#[test]
fn option_overrides_env_path() {
    with_test_env(|| {
        let server = Server::new(vec![with_path("/zero")]);
        assert_eq!(server.addr(), "0.0.0.0:1111");
        assert_eq!(server.path(), "/zero");
    });
}

#[test]
fn custom_server_handle_is_used_unchanged() {
    with_test_env(|| {
        let handle = HttpServer::builder()
            .read_header_timeout(Duration::from_secs(1))
            .build();
        let server = Server::new(vec![with_server(handle.clone())]);

        assert_eq!(server.http_server(), &handle);
        assert_eq!(server.http_server().read_timeout(), None);
        assert_eq!(server.http_server().idle_timeout(), None);
        assert_eq!(server.http_server().write_timeout(), None);
        assert_eq!(server.path(), "/testmetrics");
    });
}

#[test]
fn default_handle_gets_default_timeouts() {
    with_test_env(|| {
        let server = Server::new(vec![with_read_header_timeout(Duration::from_secs(2))]);
        let http = server.http_server();
        assert_eq!(http.read_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(http.read_header_timeout(), Some(Duration::from_secs(2)));
        assert_eq!(http.idle_timeout(), Some(Duration::from_secs(1)));
        assert_eq!(http.write_timeout(), Some(Duration::from_secs(15)));
    });
}

#[test]
fn snapshot_matches_process_env() {
    with_test_env(|| {
        let snapshot = EnvSnapshot::from_process();
        assert_eq!(snapshot.addr(), "0.0.0.0:1111");
        assert_eq!(snapshot.path(), "/testmetrics");
    });
}
