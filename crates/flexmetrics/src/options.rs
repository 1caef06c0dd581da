//! The option set accepted by [`Server::new`](crate::Server::new).
//!
//! Options are applied left to right on top of the defaults and the
//! environment, so when two options touch the same attribute the later one
//! wins.
//!
//! ```rust
//! use flexmetrics::options::{with_addr, with_path};
//! use flexmetrics::config::EnvSnapshot;
//! use flexmetrics::Server;
//!
//! let server = Server::from_env(
//!     &EnvSnapshot::default(),
//!     vec![with_addr("127.0.0.1:1"), with_path("prom"), with_addr("127.0.0.1:2")],
//! );
//! assert_eq!(server.addr(), "127.0.0.1:2");
//! assert_eq!(server.path(), "/prom");
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusHandle;

use crate::http::HttpServer;
use crate::logger::Logger;

/// One recognized configuration key together with its value.
#[derive(Clone)]
pub enum Opt {
    /// Sets the metrics path.
    Path(String),
    /// Sets the bind address of the current HTTP server handle.
    Addr(String),
    /// Replaces the HTTP server handle.
    Server(HttpServer),
    /// Sets the lifecycle logger.
    Logger(Arc<dyn Logger>),
    /// Serves the exposition from this handle.
    PrometheusHandle(PrometheusHandle),
    /// Sets the read timeout of the current HTTP server handle.
    ReadTimeout(Duration),
    /// Sets the read-header timeout of the current HTTP server handle.
    ReadHeaderTimeout(Duration),
    /// Sets the idle timeout of the current HTTP server handle.
    IdleTimeout(Duration),
    /// Sets the write timeout of the current HTTP server handle.
    WriteTimeout(Duration),
}

impl fmt::Debug for Opt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Addr(addr) => f.debug_tuple("Addr").field(addr).finish(),
            Self::Server(server) => f.debug_tuple("Server").field(server).finish(),
            Self::Logger(_) => f.write_str("Logger(..)"),
            Self::PrometheusHandle(_) => f.write_str("PrometheusHandle(..)"),
            Self::ReadTimeout(d) => f.debug_tuple("ReadTimeout").field(d).finish(),
            Self::ReadHeaderTimeout(d) => f.debug_tuple("ReadHeaderTimeout").field(d).finish(),
            Self::IdleTimeout(d) => f.debug_tuple("IdleTimeout").field(d).finish(),
            Self::WriteTimeout(d) => f.debug_tuple("WriteTimeout").field(d).finish(),
        }
    }
}

/// Serves the Prometheus exposition at `path`.
pub fn with_path(path: impl Into<String>) -> Opt {
    Opt::Path(path.into())
}

/// Binds the listener to `addr` (`host:port`, port `0` for an ephemeral one).
pub fn with_addr(addr: impl Into<String>) -> Opt {
    Opt::Addr(addr.into())
}

/// Uses `server` as the embedded HTTP server handle.
///
/// The handle is taken as is: no default timeouts are filled in.
pub fn with_server(server: HttpServer) -> Opt {
    Opt::Server(server)
}

/// Routes the startup and shutdown lines through `logger`.
pub fn with_logger(logger: impl Logger + 'static) -> Opt {
    Opt::Logger(Arc::new(logger))
}

/// Routes the startup and shutdown lines through an already shared logger.
pub fn with_shared_logger(logger: Arc<dyn Logger>) -> Opt {
    Opt::Logger(logger)
}

/// Renders the exposition from `handle` instead of the global recorder.
pub fn with_prometheus_handle(handle: PrometheusHandle) -> Opt {
    Opt::PrometheusHandle(handle)
}

/// Sets the time allowed to read a request body.
pub fn with_read_timeout(timeout: Duration) -> Opt {
    Opt::ReadTimeout(timeout)
}

/// Sets the time allowed to read request headers.
pub fn with_read_header_timeout(timeout: Duration) -> Opt {
    Opt::ReadHeaderTimeout(timeout)
}

/// Sets how long a keep-alive connection may stay idle.
pub fn with_idle_timeout(timeout: Duration) -> Opt {
    Opt::IdleTimeout(timeout)
}

/// Sets the time allowed to produce a response.
pub fn with_write_timeout(timeout: Duration) -> Opt {
    Opt::WriteTimeout(timeout)
}
