//! Binding to the Prometheus exposition collaborator.
//!
//! Unless a handle is supplied with
//! [`with_prometheus_handle`](crate::options::with_prometheus_handle), the
//! server renders from a process-global recorder installed on first use.

use std::sync::OnceLock;

use bytes::Bytes;
use http::{header, Response, StatusCode};
use http_body_util::Full;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::server::HttpResponse;
use crate::telemetry;

/// Content type of the text exposition format.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

static GLOBAL_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Returns the handle of the process-global recorder, installing it if needed.
///
/// When some other recorder already owns the global slot, a detached recorder
/// is used instead and a warning is logged; its exposition stays empty.
pub fn global_handle() -> PrometheusHandle {
    GLOBAL_HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                telemetry::describe_metrics();
                handle
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not install global prometheus recorder");
                PrometheusBuilder::new().build_recorder().handle()
            }
        })
        .clone()
}

/// Renders the exposition of `handle` as an HTTP response.
pub(crate) fn serve(handle: &PrometheusHandle) -> HttpResponse {
    let body = handle.render();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, CONTENT_TYPE)
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}
