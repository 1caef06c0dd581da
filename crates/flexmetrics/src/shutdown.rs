//! Internal shutdown signalling and connection tracking.
//!
//! The server keeps three [`ShutdownSignal`]s: one that stops the accept loop
//! and asks connections to drain, one that forcibly drops connections once the
//! caller's halt scope expires, and one that `run` triggers after the listener
//! has been dropped. Connections hold a [`ConnectionToken`] for as long as they
//! are open so that `halt` can wait for them.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, Notify};

/// A one-shot, clonable trigger that any number of tasks can await.
///
/// # Example
///
/// ```rust
/// use flexmetrics::shutdown::ShutdownSignal;
///
/// let shutdown = ShutdownSignal::new();
/// let shutdown_clone = shutdown.clone();
///
/// shutdown.trigger();
/// assert!(shutdown_clone.is_shutdown());
/// ```
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    /// Current state, `true` once triggered
    sender: Arc<watch::Sender<bool>>,
}

impl ShutdownSignal {
    /// Creates a new, untriggered signal.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Triggers the signal. Calling this more than once has no further effect.
    pub fn trigger(&self) {
        self.sender.send_if_modified(|triggered| {
            if *triggered {
                false
            } else {
                *triggered = true;
                true
            }
        });
    }

    /// Returns `true` if the signal has been triggered.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        *self.sender.borrow()
    }

    /// Returns a future that completes once the signal is triggered.
    ///
    /// Completes immediately if it already was. The receiver is registered
    /// when this is called, not when the future is first polled.
    pub fn recv(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut receiver = self.sender.subscribe();
        async move {
            let _ = receiver.wait_for(|triggered| *triggered).await;
        }
    }

    /// Returns a guard that triggers this signal when dropped.
    pub(crate) fn trigger_on_drop(&self) -> TriggerOnDrop {
        TriggerOnDrop {
            signal: self.clone(),
        }
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Triggers its signal on drop, including when the owning task is cancelled.
#[derive(Debug)]
pub(crate) struct TriggerOnDrop {
    signal: ShutdownSignal,
}

impl Drop for TriggerOnDrop {
    fn drop(&mut self) {
        self.signal.trigger();
    }
}

/// Counts open connections so shutdown can wait for them to drain.
///
/// # Example
///
/// ```rust
/// use flexmetrics::shutdown::ConnectionTracker;
///
/// let tracker = ConnectionTracker::new();
/// let token = tracker.acquire();
/// assert_eq!(tracker.active_connections(), 1);
///
/// drop(token);
/// assert_eq!(tracker.active_connections(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct ConnectionTracker {
    active: Arc<AtomicUsize>,
    notify: Arc<Notify>,
}

impl ConnectionTracker {
    /// Creates a tracker with no active connections.
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: Arc::new(AtomicUsize::new(0)),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Acquires a token for a newly accepted connection.
    #[must_use]
    pub fn acquire(&self) -> ConnectionToken {
        self.active.fetch_add(1, Ordering::SeqCst);
        ConnectionToken {
            active: Arc::clone(&self.active),
            notify: Arc::clone(&self.notify),
        }
    }

    /// Returns the number of open connections.
    #[must_use]
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Waits until every token has been dropped.
    pub async fn wait_for_shutdown(&self) {
        loop {
            // Registered before the load so a wakeup in between is not missed.
            let notified = self.notify.notified();
            if self.active.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }
}

impl Default for ConnectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// A token held for the lifetime of one connection.
#[derive(Debug)]
pub struct ConnectionToken {
    active: Arc<AtomicUsize>,
    notify: Arc<Notify>,
}

impl Drop for ConnectionToken {
    fn drop(&mut self) {
        let prev = self.active.fetch_sub(1, Ordering::SeqCst);
        if prev == 1 {
            self.notify.notify_waiters();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_shutdown_signal_trigger_idempotent() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_shutdown());
        signal.trigger();
        signal.trigger();
        assert!(signal.is_shutdown());
    }

    #[test]
    fn test_shutdown_signal_clone_shares_state() {
        let signal1 = ShutdownSignal::new();
        let signal2 = signal1.clone();

        signal1.trigger();

        assert!(signal2.is_shutdown());
    }

    #[tokio::test]
    async fn test_shutdown_recv_completes_when_triggered() {
        let signal = ShutdownSignal::new();
        let signal_clone = signal.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            signal_clone.trigger();
        });

        tokio::time::timeout(Duration::from_secs(1), signal.recv())
            .await
            .expect("recv should complete");
    }

    #[tokio::test]
    async fn test_shutdown_recv_completes_immediately_if_triggered() {
        let signal = ShutdownSignal::new();
        signal.trigger();

        tokio::time::timeout(Duration::from_millis(10), signal.recv())
            .await
            .expect("recv should complete immediately");
    }

    #[test]
    fn test_recv_pending_until_triggered() {
        let signal = ShutdownSignal::new();
        let mut recv = tokio_test::task::spawn(signal.recv());

        tokio_test::assert_pending!(recv.poll());
        signal.trigger();
        assert!(recv.is_woken());
        tokio_test::assert_ready!(recv.poll());
    }

    #[test]
    fn test_trigger_on_drop() {
        let signal = ShutdownSignal::new();
        let guard = signal.trigger_on_drop();
        assert!(!signal.is_shutdown());
        drop(guard);
        assert!(signal.is_shutdown());
    }

    #[test]
    fn test_connection_tracker_counts() {
        let tracker = ConnectionTracker::new();
        let token1 = tracker.acquire();
        let token2 = tracker.acquire();
        assert_eq!(tracker.active_connections(), 2);

        drop(token1);
        assert_eq!(tracker.active_connections(), 1);

        drop(token2);
        assert_eq!(tracker.active_connections(), 0);
    }

    #[tokio::test]
    async fn test_connection_tracker_wait_for_shutdown_immediate() {
        let tracker = ConnectionTracker::new();

        tokio::time::timeout(Duration::from_millis(10), tracker.wait_for_shutdown())
            .await
            .expect("wait_for_shutdown should complete immediately");
    }

    #[tokio::test]
    async fn test_connection_tracker_wait_for_shutdown_delayed() {
        let tracker = ConnectionTracker::new();
        let token = tracker.acquire();

        let tracker_clone = tracker.clone();
        let wait_handle = tokio::spawn(async move {
            tracker_clone.wait_for_shutdown().await;
        });

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            drop(token);
        });

        tokio::time::timeout(Duration::from_secs(1), wait_handle)
            .await
            .expect("wait should complete")
            .expect("task should not panic");
    }
}
