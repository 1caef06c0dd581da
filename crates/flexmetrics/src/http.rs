//! The embedded HTTP server handle.
//!
//! [`HttpServer`] carries the bind address and the connection timeouts used by
//! [`Server::run`](crate::Server::run). A handle built by hand (or with
//! [`HttpServer::builder`]) has no timeouts unless you set them; the resolver
//! only fills in defaults when no explicit handle was supplied.
//!
//! # Example
//!
//! ```rust
//! use flexmetrics::http::HttpServer;
//! use std::time::Duration;
//!
//! let server = HttpServer::builder()
//!     .addr("127.0.0.1:0")
//!     .read_header_timeout(Duration::from_secs(1))
//!     .build();
//!
//! assert_eq!(server.addr(), "127.0.0.1:0");
//! assert_eq!(server.read_timeout(), None);
//! ```

use std::time::Duration;

use crate::config::{
    DEFAULT_IDLE_TIMEOUT, DEFAULT_READ_HEADER_TIMEOUT, DEFAULT_READ_TIMEOUT,
    DEFAULT_WRITE_TIMEOUT,
};

/// Address bound when a handle carries no address.
const UNSPECIFIED_ADDR: &str = "0.0.0.0:0";

/// Embedded HTTP server settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpServer {
    /// Bind address (`host:port`)
    addr: String,

    /// Time allowed to read a request body
    read_timeout: Option<Duration>,

    /// Time allowed to read request headers
    read_header_timeout: Option<Duration>,

    /// Time a keep-alive connection may sit idle between requests
    idle_timeout: Option<Duration>,

    /// Time allowed to produce a response
    write_timeout: Option<Duration>,
}

impl HttpServer {
    /// Creates a new handle builder.
    #[must_use]
    pub fn builder() -> HttpServerBuilder {
        HttpServerBuilder::default()
    }

    /// Creates a handle bound to `addr` with the default timeouts.
    #[must_use]
    pub fn with_default_timeouts(addr: impl Into<String>) -> Self {
        Self::builder()
            .addr(addr)
            .read_timeout(DEFAULT_READ_TIMEOUT)
            .read_header_timeout(DEFAULT_READ_HEADER_TIMEOUT)
            .idle_timeout(DEFAULT_IDLE_TIMEOUT)
            .write_timeout(DEFAULT_WRITE_TIMEOUT)
            .build()
    }

    /// Returns the configured bind address.
    #[must_use]
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Returns the address handed to the socket layer.
    ///
    /// Accepts the short forms `:port` (all IPv4 interfaces), `host:` (port 0)
    /// and the empty string (`0.0.0.0:0`).
    #[must_use]
    pub fn bind_addr(&self) -> String {
        let addr = self.addr.trim();
        if addr.is_empty() {
            return UNSPECIFIED_ADDR.to_string();
        }
        let addr = if addr.starts_with(':') {
            format!("0.0.0.0{addr}")
        } else {
            addr.to_string()
        };
        if addr.ends_with(':') {
            format!("{addr}0")
        } else {
            addr
        }
    }

    /// Returns the read timeout.
    #[must_use]
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout
    }

    /// Returns the read-header timeout.
    #[must_use]
    pub fn read_header_timeout(&self) -> Option<Duration> {
        self.read_header_timeout
    }

    /// Returns the idle timeout.
    #[must_use]
    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout
    }

    /// Returns the write timeout.
    #[must_use]
    pub fn write_timeout(&self) -> Option<Duration> {
        self.write_timeout
    }

    /// The header timeout actually applied: read-header, else read.
    pub(crate) fn effective_header_timeout(&self) -> Option<Duration> {
        self.read_header_timeout.or(self.read_timeout)
    }

    /// The keep-alive idle timeout actually applied: idle, else read.
    pub(crate) fn effective_idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout.or(self.read_timeout)
    }

    pub(crate) fn set_addr(&mut self, addr: String) {
        self.addr = addr;
    }

    pub(crate) fn set_read_timeout(&mut self, timeout: Duration) {
        self.read_timeout = Some(timeout);
    }

    pub(crate) fn set_read_header_timeout(&mut self, timeout: Duration) {
        self.read_header_timeout = Some(timeout);
    }

    pub(crate) fn set_idle_timeout(&mut self, timeout: Duration) {
        self.idle_timeout = Some(timeout);
    }

    pub(crate) fn set_write_timeout(&mut self, timeout: Duration) {
        self.write_timeout = Some(timeout);
    }
}

/// Builder for [`HttpServer`].
#[derive(Debug, Clone, Default)]
pub struct HttpServerBuilder {
    inner: HttpServer,
}

impl HttpServerBuilder {
    /// Sets the bind address.
    #[must_use]
    pub fn addr(mut self, addr: impl Into<String>) -> Self {
        self.inner.addr = addr.into();
        self
    }

    /// Sets the time allowed to read a request body.
    #[must_use]
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.inner.read_timeout = Some(timeout);
        self
    }

    /// Sets the time allowed to read request headers.
    #[must_use]
    pub fn read_header_timeout(mut self, timeout: Duration) -> Self {
        self.inner.read_header_timeout = Some(timeout);
        self
    }

    /// Sets how long a keep-alive connection may stay idle.
    #[must_use]
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.inner.idle_timeout = Some(timeout);
        self
    }

    /// Sets the time allowed to produce a response.
    #[must_use]
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.inner.write_timeout = Some(timeout);
        self
    }

    /// Builds the handle.
    #[must_use]
    pub fn build(self) -> HttpServer {
        self.inner
    }
}
