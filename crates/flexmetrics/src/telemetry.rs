//! Self-instrumentation of the embedded HTTP server.
//!
//! # Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `flexmetrics_http_requests_total` | Counter | `route`, `status` | Requests served |
//! | `flexmetrics_http_request_duration_seconds` | Histogram | `route` | Request latency |
//! | `flexmetrics_http_in_flight_requests` | Gauge | - | Requests being served |
//!
//! Recorded through the `metrics` facade, so they land in whichever recorder
//! is installed globally.

use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};

/// Counter of served requests.
pub const REQUESTS_TOTAL: &str = "flexmetrics_http_requests_total";

/// Histogram of request latency.
pub const REQUEST_DURATION_SECONDS: &str = "flexmetrics_http_request_duration_seconds";

/// Gauge of requests currently being served.
pub const IN_FLIGHT_REQUESTS: &str = "flexmetrics_http_in_flight_requests";

/// Registers descriptions for the server's own metrics.
pub fn describe_metrics() {
    describe_counter!(REQUESTS_TOTAL, "Total number of HTTP requests served");
    describe_histogram!(
        REQUEST_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "HTTP request duration in seconds"
    );
    describe_gauge!(
        IN_FLIGHT_REQUESTS,
        "Number of HTTP requests currently being served"
    );
}

/// Records a completed request.
///
/// `route` is the endpoint label, or `not_found` for unmatched paths.
pub fn record_request(route: &'static str, status_code: u16, duration: Duration) {
    counter!(
        REQUESTS_TOTAL,
        "route" => route,
        "status" => status_code.to_string()
    )
    .increment(1);

    histogram!(REQUEST_DURATION_SECONDS, "route" => route).record(duration.as_secs_f64());
}

/// Keeps the in-flight gauge raised for as long as it lives.
#[derive(Debug)]
pub struct InFlightGuard {
    _private: (),
}

impl InFlightGuard {
    /// Increments the in-flight gauge.
    #[must_use]
    pub fn new() -> Self {
        gauge!(IN_FLIGHT_REQUESTS).increment(1.0);
        Self { _private: () }
    }
}

impl Default for InFlightGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!(IN_FLIGHT_REQUESTS).decrement(1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::PrometheusBuilder;

    #[test]
    fn test_record_request_is_rendered() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            describe_metrics();
            record_request("metrics", 200, Duration::from_millis(3));
            record_request("metrics", 200, Duration::from_millis(5));
        });

        let output = handle.render();
        assert!(output.contains(REQUESTS_TOTAL));
        assert!(output.contains(r#"route="metrics""#));
        assert!(output.contains(r#"status="200""#));
        assert!(output.contains(REQUEST_DURATION_SECONDS));
    }

    #[test]
    fn test_in_flight_guard_returns_to_zero() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            let guard = InFlightGuard::new();
            drop(guard);
        });

        let output = handle.render();
        let value: f64 = output
            .lines()
            .find(|line| line.starts_with(IN_FLIGHT_REQUESTS))
            .and_then(|line| line.split_whitespace().last())
            .and_then(|v| v.parse().ok())
            .unwrap();
        assert!(value.abs() < f64::EPSILON);
    }

    #[test]
    fn test_record_without_recorder_does_not_panic() {
        record_request("pprof_index", 404, Duration::from_millis(1));
        let _guard = InFlightGuard::default();
    }
}
