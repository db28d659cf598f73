//! Read-only session heartbeat.
//!
//! One monitor may run per authenticated principal, purely for
//! observability. It never touches the token store: all writes go through
//! the per-request renewal path, so the monitor and a request can never
//! race on the same cookie.

use std::time::Duration;
use tokio::task::JoinHandle;

/// Default heartbeat interval.
pub const DEFAULT_MONITOR_INTERVAL: Duration = Duration::from_secs(300);

/// Periodic log-only heartbeat for one principal's session.
#[derive(Debug, Default)]
pub struct RenewalMonitor {
    handle: Option<JoinHandle<()>>,
}

impl RenewalMonitor {
    /// Creates a stopped monitor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the heartbeat for the given principal, replacing any
    /// heartbeat already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, principal: &str, interval: Duration) {
        self.stop();

        let principal = principal.to_string();
        self.handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately; skip it so the heartbeat
            // starts one full interval after login.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                tracing::debug!(
                    principal = %principal,
                    "session heartbeat: renewal, if due, happens on the next request"
                );
            }
        }));

        tracing::info!(interval_secs = interval.as_secs(), "session monitor started");
    }

    /// Stops the heartbeat. Calling this on a stopped monitor is a
    /// no-op.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::info!("session monitor stopped");
        }
    }

    /// Returns true while a heartbeat task is held.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for RenewalMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn monitor_starts_and_stops() {
        let mut monitor = RenewalMonitor::new();
        assert!(!monitor.is_running());

        monitor.start("user-1", Duration::from_secs(1));
        assert!(monitor.is_running());

        monitor.stop();
        assert!(!monitor.is_running());
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let mut monitor = RenewalMonitor::new();
        monitor.stop();
        monitor.stop();
        assert!(!monitor.is_running());
    }

    #[tokio::test]
    async fn start_replaces_running_monitor() {
        let mut monitor = RenewalMonitor::new();
        monitor.start("user-1", Duration::from_secs(1));
        monitor.start("user-1", Duration::from_secs(2));
        assert!(monitor.is_running());
        monitor.stop();
    }
}
