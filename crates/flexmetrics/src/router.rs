//! The request multiplexer installed by [`Server::run`](crate::Server::run).
//!
//! Paths match exactly, with no templates or prefixes. Routes are checked in
//! order and the first path match wins, so a metrics path that shadows a
//! profiling path takes precedence.
//!
//! # Example
//!
//! ```rust
//! use flexmetrics::router::{Endpoint, RouteOutcome, Router};
//! use http::Method;
//!
//! let router = Router::new("/metrics");
//!
//! assert_eq!(
//!     router.match_route(&Method::GET, "/metrics"),
//!     RouteOutcome::Matched(Endpoint::Metrics)
//! );
//! assert_eq!(router.match_route(&Method::GET, "/nope"), RouteOutcome::NotFound);
//! ```

use http::Method;

/// Path prefix of the profiling endpoints.
pub const PPROF_PREFIX: &str = "/debug/pprof/";

/// A handler the multiplexer can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Prometheus text exposition
    Metrics,
    /// Profiler index page
    PprofIndex,
    /// Process command line
    PprofCmdline,
    /// CPU profile
    PprofProfile,
    /// Symbol lookup
    PprofSymbol,
    /// Execution trace
    PprofTrace,
}

impl Endpoint {
    /// Label used for this endpoint in self-instrumentation metrics.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Metrics => "metrics",
            Self::PprofIndex => "pprof_index",
            Self::PprofCmdline => "pprof_cmdline",
            Self::PprofProfile => "pprof_profile",
            Self::PprofSymbol => "pprof_symbol",
            Self::PprofTrace => "pprof_trace",
        }
    }
}

/// Result of matching a request against the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// The path and method are served by this endpoint.
    Matched(Endpoint),
    /// The path is known but not for this method; carries the `Allow` value.
    MethodNotAllowed(String),
    /// No route has this path.
    NotFound,
}

/// A registered route.
#[derive(Debug, Clone)]
struct Route {
    /// Exact request path
    path: String,

    /// Accepted methods
    methods: Vec<Method>,

    endpoint: Endpoint,
}

impl Route {
    fn allow_header(&self) -> String {
        self.methods
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Exact-path route table.
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Builds the standard table: the exposition at `metrics_path` plus the
    /// profiling suite under [`PPROF_PREFIX`].
    #[must_use]
    pub fn new(metrics_path: &str) -> Self {
        let read = || vec![Method::GET, Method::HEAD];

        let mut router = Self::empty();
        router.add_route(read(), metrics_path, Endpoint::Metrics);
        router.add_route(read(), PPROF_PREFIX, Endpoint::PprofIndex);
        router.add_route(read(), "/debug/pprof/cmdline", Endpoint::PprofCmdline);
        router.add_route(read(), "/debug/pprof/profile", Endpoint::PprofProfile);
        router.add_route(
            vec![Method::GET, Method::HEAD, Method::POST],
            "/debug/pprof/symbol",
            Endpoint::PprofSymbol,
        );
        router.add_route(read(), "/debug/pprof/trace", Endpoint::PprofTrace);
        router
    }

    /// Creates a table with no routes.
    #[must_use]
    pub fn empty() -> Self {
        Self { routes: Vec::new() }
    }

    /// Registers `endpoint` for `methods` at exactly `path`.
    pub fn add_route(&mut self, methods: Vec<Method>, path: impl Into<String>, endpoint: Endpoint) {
        self.routes.push(Route {
            path: path.into(),
            methods,
            endpoint,
        });
    }

    /// Returns the number of registered routes.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Matches a request against the table.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> RouteOutcome {
        let Some(route) = self.routes.iter().find(|r| r.path == path) else {
            return RouteOutcome::NotFound;
        };

        if route.methods.contains(method) {
            RouteOutcome::Matched(route.endpoint)
        } else {
            RouteOutcome::MethodNotAllowed(route.allow_header())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table() {
        let router = Router::new("/metrics");
        assert_eq!(router.route_count(), 6);

        let cases = [
            ("/metrics", Endpoint::Metrics),
            ("/debug/pprof/", Endpoint::PprofIndex),
            ("/debug/pprof/cmdline", Endpoint::PprofCmdline),
            ("/debug/pprof/profile", Endpoint::PprofProfile),
            ("/debug/pprof/symbol", Endpoint::PprofSymbol),
            ("/debug/pprof/trace", Endpoint::PprofTrace),
        ];
        for (path, endpoint) in cases {
            assert_eq!(
                router.match_route(&Method::GET, path),
                RouteOutcome::Matched(endpoint),
                "{path}"
            );
        }
    }

    #[test]
    fn test_head_accepted_where_get_is() {
        let router = Router::new("/metrics");
        assert_eq!(
            router.match_route(&Method::HEAD, "/metrics"),
            RouteOutcome::Matched(Endpoint::Metrics)
        );
    }

    #[test]
    fn test_symbol_accepts_post() {
        let router = Router::new("/metrics");
        assert_eq!(
            router.match_route(&Method::POST, "/debug/pprof/symbol"),
            RouteOutcome::Matched(Endpoint::PprofSymbol)
        );
    }

    #[test]
    fn test_method_not_allowed() {
        let router = Router::new("/metrics");
        assert_eq!(
            router.match_route(&Method::DELETE, "/metrics"),
            RouteOutcome::MethodNotAllowed("GET, HEAD".to_string())
        );
        assert_eq!(
            router.match_route(&Method::PUT, "/debug/pprof/symbol"),
            RouteOutcome::MethodNotAllowed("GET, HEAD, POST".to_string())
        );
    }

    #[test]
    fn test_unknown_paths_not_found() {
        let router = Router::new("/metrics");
        for path in ["/", "/metrics/", "/debug/pprof", "/debug/pprof/heap", "/METRICS"] {
            assert_eq!(router.match_route(&Method::GET, path), RouteOutcome::NotFound, "{path}");
        }
    }

    #[test]
    fn test_custom_metrics_path() {
        let router = Router::new("/zero");
        assert_eq!(
            router.match_route(&Method::GET, "/zero"),
            RouteOutcome::Matched(Endpoint::Metrics)
        );
        assert_eq!(router.match_route(&Method::GET, "/metrics"), RouteOutcome::NotFound);
    }

    #[test]
    fn test_metrics_path_shadows_profiling_route() {
        let router = Router::new("/debug/pprof/trace");
        assert_eq!(
            router.match_route(&Method::GET, "/debug/pprof/trace"),
            RouteOutcome::Matched(Endpoint::Metrics)
        );
    }
}
