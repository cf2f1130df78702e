//! Liveness watchdog for the inbound side of a connection.
//!
//! Some transports never report half-open failures. The monitor tracks a
//! deadline that every inbound frame pushes forward; when the deadline
//! passes, the connection manager closes the connection and goes through the
//! normal reconnect path.

use std::time::Duration;

use tokio::time::{sleep_until, Instant};

/// Default silence window before a connection is considered dead.
pub const DEFAULT_HEARTBEAT_TIMEOUT: Duration = Duration::from_secs(45);

#[derive(Debug, Clone)]
pub struct HeartbeatMonitor {
    timeout: Duration,
    deadline: Instant,
}

impl HeartbeatMonitor {
    /// Creates an armed monitor whose deadline is `timeout` from now.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            deadline: Instant::now() + timeout,
        }
    }

    /// Pushes the deadline to `timeout` from now.
    pub fn reset(&mut self) {
        self.deadline = Instant::now() + self.timeout;
    }

    /// Completes once the deadline passes without an intervening reset.
    ///
    /// Cancel-safe: dropping the future and calling again waits for the
    /// current deadline.
    pub async fn expired(&self) {
        sleep_until(self.deadline).await;
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }
}

impl Default for HeartbeatMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_HEARTBEAT_TIMEOUT)
    }
}
