//! Error types for the metrics server.

use thiserror::Error;

/// Errors returned by [`Server::run`](crate::Server::run) and
/// [`Server::halt`](crate::Server::halt).
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listener could not be bound to the configured address.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// The address that was requested.
        addr: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The accept loop terminated with a non-transient error.
    #[error("failed to accept connection: {0}")]
    Serve(#[source] std::io::Error),

    /// `run` was called on a server that has already been started.
    #[error("server has already been started")]
    AlreadyStarted,

    /// `halt` was called before the server bound a listener.
    #[error("listener address not found: server is not serving")]
    NotServing,

    /// The shutdown scope fired before in-flight requests completed.
    #[error("graceful shutdown cancelled with {active} request(s) still in flight")]
    ShutdownCancelled {
        /// Requests whose connections were forcibly closed.
        active: usize,
    },
}

/// Errors raised while collecting a CPU profile or trace.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The sampling profiler could not be started (usually already running).
    #[error("Could not enable CPU profiling: {0}")]
    Start(String),

    /// The sampled data could not be turned into a report.
    #[error("Could not build profile report: {0}")]
    Report(String),

    /// The report could not be encoded.
    #[error("Could not encode profile: {0}")]
    Encode(String),
}

/// Errors raised while installing the `tracing` subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The filter directive could not be parsed.
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    /// A global subscriber was already installed.
    #[error("Failed to initialize logging: {0}")]
    Init(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_error_display() {
        let err = ServerError::Bind {
            addr: "127.0.0.1:1".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use"),
        };
        assert_eq!(err.to_string(), "failed to bind 127.0.0.1:1: address in use");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_shutdown_cancelled_display() {
        let err = ServerError::ShutdownCancelled { active: 2 };
        assert!(err.to_string().contains("2 request(s) still in flight"));
    }

    #[test]
    fn test_profile_error_display() {
        let err = ProfileError::Start("already running".to_string());
        assert_eq!(err.to_string(), "Could not enable CPU profiling: already running");
    }

    #[test]
    fn test_logging_error_display() {
        let err = LoggingError::InvalidFilter("bad".to_string());
        assert_eq!(err.to_string(), "Invalid log filter: bad");
    }
}
