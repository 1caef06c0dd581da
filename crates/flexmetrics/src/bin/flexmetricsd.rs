//! Standalone metrics and profiling daemon.
//!
//! Serves the process's own metrics and profiling endpoints until SIGTERM or
//! SIGINT, then drains in-flight requests for up to 15 seconds.
//!
//! Configured through `METRICS_ADDR`, `METRICS_PROMETHEUS_PATH`,
//! `FLEXMETRICS_LOG` and `FLEXMETRICS_LOG_FORMAT`.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use flexmetrics::logging::{init_logging, LogConfig};
use flexmetrics::options::with_logger;
use flexmetrics::{prometheus, HaltOutcome, Scope, Server, TracingLogger};

/// Upper bound on draining connections at shutdown.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(15);

/// Interval between uptime gauge updates.
const UPTIME_INTERVAL: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = init_logging(&LogConfig::from_env()) {
        eprintln!("flexmetricsd: {e}");
        return ExitCode::FAILURE;
    }

    // Installs the global recorder before anything records.
    let _ = prometheus::global_handle();
    tokio::spawn(record_uptime());

    let server = Arc::new(Server::new(vec![with_logger(TracingLogger)]));
    let runner = Arc::clone(&server);
    let mut serving = tokio::spawn(async move { runner.run(&Scope::new()).await });

    let signals = Scope::with_os_signals();
    tokio::select! {
        () = signals.cancelled() => {}
        result = &mut serving => {
            return match result {
                Ok(Ok(())) => ExitCode::SUCCESS,
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "metrics server failed");
                    ExitCode::FAILURE
                }
                Err(e) => {
                    tracing::error!(error = %e, "metrics server task panicked");
                    ExitCode::FAILURE
                }
            };
        }
    }

    let code = match server.halt(&Scope::with_timeout(SHUTDOWN_TIMEOUT)).await {
        Ok(HaltOutcome::Graceful | HaltOutcome::AlreadyStopped) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "shutdown failed");
            ExitCode::FAILURE
        }
    };

    match serving.await {
        Ok(Ok(())) => code,
        Ok(Err(e)) => {
            tracing::error!(error = %e, "metrics server failed");
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!(error = %e, "metrics server task panicked");
            ExitCode::FAILURE
        }
    }
}

async fn record_uptime() {
    metrics::describe_gauge!(
        "flexmetricsd_uptime_seconds",
        metrics::Unit::Seconds,
        "Seconds since the daemon started"
    );
    let started = Instant::now();
    let mut interval = tokio::time::interval(UPTIME_INTERVAL);
    loop {
        interval.tick().await;
        metrics::gauge!("flexmetricsd_uptime_seconds").set(started.elapsed().as_secs_f64());
    }
}
