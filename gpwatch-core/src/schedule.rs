//! Refresh scheduling.
//!
//! The next refresh is always computed from the moment the previous one
//! finished (`now + interval`), so a slow refresh pushes the whole schedule
//! later. There is no attempt to hit fixed wall-clock ticks.

use std::time::{Duration, Instant};

/// Default refresh interval in seconds.
pub const DEFAULT_REFRESH_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct RefreshScheduler {
    interval: Duration,
    next_due_at: Instant,
}

impl RefreshScheduler {
    /// A scheduler whose first refresh is due immediately.
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next_due_at: now,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn next_due_at(&self) -> Instant {
        self.next_due_at
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next_due_at
    }

    /// Record a completed refresh.
    pub fn complete(&mut self, now: Instant) {
        self.next_due_at = now + self.interval;
    }

    /// Start a fresh window from `now`, discarding any elapsed countdown.
    pub fn restart(&mut self, now: Instant) {
        self.complete(now);
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.next_due_at.saturating_duration_since(now)
    }

    /// Remaining share of the interval in `[0.0, 1.0]`.
    pub fn fraction_remaining(&self, now: Instant) -> f64 {
        if self.interval.is_zero() {
            return 0.0;
        }
        (self.remaining(now).as_secs_f64() / self.interval.as_secs_f64()).clamp(0.0, 1.0)
    }
}
