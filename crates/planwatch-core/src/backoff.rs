//! Exponential backoff schedule for reconnect attempts.

use std::time::Duration;

/// Delay before the first reconnect attempt.
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_millis(1000);

/// Upper bound for any single reconnect delay.
pub const DEFAULT_MAX_RECONNECT_INTERVAL: Duration = Duration::from_millis(30_000);

/// Consecutive failed attempts after which reconnection stops.
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 10;

/// Reconnect schedule: `min(base * 2^attempts, max)`, at most
/// `max_attempts` times in a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub base: Duration,
    pub max: Duration,
    pub max_attempts: u32,
}

impl ReconnectPolicy {
    pub fn new(base: Duration, max: Duration, max_attempts: u32) -> Self {
        Self {
            base,
            max,
            max_attempts,
        }
    }

    /// Delay for the given zero-based attempt number, capped at `max`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base
            .checked_mul(factor)
            .map_or(self.max, |delay| delay.min(self.max))
    }

    /// Delay before the next attempt, or `None` once `attempts` consecutive
    /// attempts have already been scheduled.
    pub fn next_delay(&self, attempts: u32) -> Option<Duration> {
        (attempts < self.max_attempts).then(|| self.delay_for_attempt(attempts))
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_RECONNECT_INTERVAL,
            DEFAULT_MAX_RECONNECT_INTERVAL,
            DEFAULT_MAX_RECONNECT_ATTEMPTS,
        )
    }
}
