//! Bounded retry with a fixed delay.

use std::time::{Duration, Instant};

/// Attempts made before focus acquisition gives up
pub const FOCUS_RETRY_ATTEMPTS: u32 = 10;
/// Delay between focus acquisition attempts
pub const FOCUS_RETRY_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Policy used when activating the app after a show
    pub const fn focus() -> Self {
        Self::new(FOCUS_RETRY_ATTEMPTS, FOCUS_RETRY_INTERVAL)
    }

    /// Deadline for the attempt following `attempt` (1-based), or `None`
    /// once the budget is spent
    pub fn next_after(&self, attempt: u32, now: Instant) -> Option<Instant> {
        (attempt < self.max_attempts).then(|| now + self.interval)
    }

    /// Worst-case wait across every attempt
    pub fn total_budget(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::focus()
    }
}
