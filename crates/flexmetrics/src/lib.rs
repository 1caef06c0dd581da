//! Embeddable HTTP server exposing Prometheus metrics and profiling endpoints.
//!
//! Start it as a background task inside a larger application, configure it
//! with options and environment variables, and stop it during shutdown.
//!
//! # Endpoints
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | GET | `<path>` (default `/metrics`) | Prometheus text exposition |
//! | GET | `/debug/pprof/` | profiler index |
//! | GET | `/debug/pprof/cmdline` | process command line |
//! | GET | `/debug/pprof/profile` | CPU profile (pprof protobuf) |
//! | GET, POST | `/debug/pprof/symbol` | symbol lookup |
//! | GET | `/debug/pprof/trace` | execution trace (folded stacks) |
//!
//! Anything else gets a 404.
//!
//! # Configuration
//!
//! Lowest to highest precedence: built-in defaults (`0.0.0.0:9090`,
//! `/metrics`), the `METRICS_ADDR` and `METRICS_PROMETHEUS_PATH` environment
//! variables, then [`options`] applied left to right.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use flexmetrics::options::{with_addr, with_path};
//! use flexmetrics::{Scope, Server};
//!
//! # async fn example() -> Result<(), flexmetrics::ServerError> {
//! let server = Arc::new(Server::new(vec![with_addr(":9090"), with_path("/metrics")]));
//!
//! let runner = Arc::clone(&server);
//! tokio::spawn(async move { runner.run(&Scope::new()).await });
//!
//! // ... application runs ...
//!
//! server.halt(&Scope::with_timeout(Duration::from_secs(15))).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod logger;
pub mod logging;
pub mod options;
pub mod pprof;
pub mod prometheus;
pub mod router;
pub mod scope;
pub mod server;
pub mod shutdown;
pub mod telemetry;

pub use config::{EnvSnapshot, MetricsConfig};
pub use context::{RequestContext, SERVER_ADDR_KEY};
pub use error::{LoggingError, ProfileError, ServerError};
pub use crate::http::{HttpServer, HttpServerBuilder};
pub use logger::{Logger, StderrLogger, TracingLogger, WriterLogger};
pub use options::{
    with_addr, with_idle_timeout, with_logger, with_path, with_prometheus_handle,
    with_read_header_timeout, with_read_timeout, with_server, with_shared_logger,
    with_write_timeout, Opt,
};
pub use scope::Scope;
pub use server::{HaltOutcome, Server, State};
