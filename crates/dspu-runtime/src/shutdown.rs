use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

/// Graceful shutdown tuning.
#[derive(Debug, Clone)]
pub struct ShutdownConfig {
    /// Bound on how long to wait for in-flight requests to drain.
    pub drain_timeout: Duration,
    /// Polling interval while waiting.
    pub poll_interval: Duration,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            drain_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// Coordinates the drain window between a shutdown signal and process
/// exit: stop accepting new in-flight work, wait (bounded) for existing
/// work to finish, then let the caller release the election lock and
/// close the backing-store session.
pub struct GracefulShutdown {
    config: ShutdownConfig,
    shutdown_requested: AtomicBool,
    in_flight_count: AtomicU32,
    shutdown_tx: broadcast::Sender<()>,
}

impl GracefulShutdown {
    pub fn new(config: ShutdownConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config,
            shutdown_requested: AtomicBool::new(false),
            in_flight_count: AtomicU32::new(0),
            shutdown_tx,
        }
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::SeqCst)
    }

    pub fn in_flight_count(&self) -> u32 {
        self.in_flight_count.load(Ordering::SeqCst)
    }

    fn increment_in_flight(&self) {
        self.in_flight_count.fetch_add(1, Ordering::SeqCst);
    }

    fn decrement_in_flight(&self) {
        self.in_flight_count.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    pub fn should_accept_work(&self) -> bool {
        !self.shutdown_requested.load(Ordering::SeqCst)
    }

    /// Mark shutdown requested, notify subscribers, and wait (bounded) for
    /// in-flight requests to finish.
    pub async fn drain(self: &Arc<Self>) {
        self.shutdown_requested.store(true, Ordering::SeqCst);
        let _ = self.shutdown_tx.send(());

        let deadline = tokio::time::Instant::now() + self.config.drain_timeout;
        loop {
            let count = self.in_flight_count.load(Ordering::SeqCst);
            if count == 0 {
                tracing::info!("all in-flight requests completed");
                return;
            }
            if tokio::time::Instant::now() >= deadline {
                tracing::warn!(remaining = count, "drain timeout reached");
                return;
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }
}

/// RAII guard tracking one in-flight request against a [`GracefulShutdown`].
pub struct InFlightGuard {
    shutdown: Arc<GracefulShutdown>,
}

impl InFlightGuard {
    /// Returns `None` if shutdown is already in progress, signalling the
    /// caller to reject the request instead of counting it in-flight.
    pub fn try_new(shutdown: Arc<GracefulShutdown>) -> Option<Self> {
        if shutdown.should_accept_work() {
            shutdown.increment_in_flight();
            Some(Self { shutdown })
        } else {
            None
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.shutdown.decrement_in_flight();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_drain_timeout_is_bounded() {
        let config = ShutdownConfig::default();
        assert!(config.drain_timeout <= Duration::from_secs(10));
    }

    #[test]
    fn in_flight_guard_rejects_after_shutdown_requested() {
        let shutdown = Arc::new(GracefulShutdown::new(ShutdownConfig::default()));
        shutdown.shutdown_requested.store(true, Ordering::SeqCst);
        assert!(InFlightGuard::try_new(shutdown).is_none());
    }

    #[test]
    fn in_flight_guard_counts_while_held() {
        let shutdown = Arc::new(GracefulShutdown::new(ShutdownConfig::default()));
        let guard = InFlightGuard::try_new(shutdown.clone()).unwrap();
        assert_eq!(shutdown.in_flight_count(), 1);
        drop(guard);
        assert_eq!(shutdown.in_flight_count(), 0);
    }
}
