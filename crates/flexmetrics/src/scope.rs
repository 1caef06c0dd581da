//! Cancellation scopes passed to [`Server::run`](crate::Server::run) and
//! [`Server::halt`](crate::Server::halt).
//!
//! A [`Scope`] fires either when it is cancelled explicitly or when its
//! deadline (if any) passes. Clones share the same cancellation state.
//!
//! # Example
//!
//! ```rust,ignore
//! use flexmetrics::Scope;
//! use std::time::Duration;
//!
//! // Give in-flight scrapes at most five seconds to finish.
//! let scope = Scope::with_timeout(Duration::from_secs(5));
//! server.halt(&scope).await?;
//! ```

use std::time::Duration;

use tokio::time::Instant;

use crate::shutdown::ShutdownSignal;

/// A cancellation scope: an explicit trigger plus an optional deadline.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    signal: ShutdownSignal,
    deadline: Option<Instant>,
}

impl Scope {
    /// Creates a scope that only fires when [`cancel`](Self::cancel) is called.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scope that fires after `timeout` has elapsed.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// Creates a scope that fires at `deadline`.
    #[must_use]
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            signal: ShutdownSignal::new(),
            deadline: Some(deadline),
        }
    }

    /// Creates a scope that is cancelled on SIGTERM or SIGINT.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn with_os_signals() -> Self {
        let scope = Self::new();
        let signal = scope.signal.clone();

        tokio::spawn(async move {
            wait_for_os_signal().await;
            signal.trigger();
        });

        scope
    }

    /// Cancels the scope and every clone of it.
    pub fn cancel(&self) {
        self.signal.trigger();
    }

    /// Returns the deadline, if the scope has one.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns `true` if the scope was cancelled or its deadline has passed.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.signal.is_shutdown() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Completes when the scope is cancelled or its deadline passes.
    pub async fn cancelled(&self) {
        let signal = self.signal.recv();
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    () = signal => {}
                    () = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => signal.await,
        }
    }
}

/// Waits for SIGTERM or SIGINT (Ctrl+C elsewhere).
async fn wait_for_os_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(term), Ok(int)) => (term, int),
                (Err(e), _) | (_, Err(e)) => {
                    tracing::error!(error = %e, "failed to register signal handlers");
                    return std::future::pending().await;
                }
            };

        tokio::select! {
            _ = sigterm.recv() => tracing::info!("received SIGTERM"),
            _ = sigint.recv() => tracing::info!("received SIGINT"),
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            return std::future::pending().await;
        }
        tracing::info!("received Ctrl+C");
    }
}
