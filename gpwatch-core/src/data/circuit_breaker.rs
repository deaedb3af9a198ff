//! Circuit breaker for quote provider rate limiting and IP bans.
//!
//! The breaker only reacts to provider-wide signals: an HTTP 403 (IP ban)
//! opens it at once, and HTTP 429 answers for several distinct symbols open
//! it too. Failures confined to one symbol never open it, so a single bad
//! ticker cannot block the rest of the portfolio. While open, every fetch
//! fails fast until the cooldown expires.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::domain::Symbol;

/// Distinct rate-limited symbols that open the breaker.
pub const RATE_LIMIT_THRESHOLD: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// Requests are allowed.
    Closed,
    /// Requests are refused until the cooldown expires.
    Open { tripped_at: Instant },
}

#[derive(Debug)]
struct Inner {
    state: BreakerState,
    rate_limited: HashSet<Symbol>,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    inner: Mutex<Inner>,
    cooldown: Duration,
}

impl CircuitBreaker {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: BreakerState::Closed,
                rate_limited: HashSet::new(),
            }),
            cooldown,
        }
    }

    /// Five-minute cooldown; short enough for an interactive session.
    pub fn default_provider() -> Self {
        Self::new(Duration::from_secs(5 * 60))
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a request may be sent now. An expired cooldown closes the breaker.
    pub fn is_allowed(&self) -> bool {
        let mut inner = self.lock();
        match inner.state {
            BreakerState::Closed => true,
            BreakerState::Open { tripped_at } => {
                if tripped_at.elapsed() >= self.cooldown {
                    inner.state = BreakerState::Closed;
                    inner.rate_limited.clear();
                    true
                } else {
                    false
                }
            }
        }
    }

    /// A successful response clears the rate-limit tally.
    pub fn record_success(&self) {
        self.lock().rate_limited.clear();
    }

    /// Note a 429 for `symbol`. Repeats for the same symbol count once.
    pub fn record_rate_limited(&self, symbol: &Symbol) {
        let mut inner = self.lock();
        inner.rate_limited.insert(symbol.clone());
        if inner.rate_limited.len() >= RATE_LIMIT_THRESHOLD {
            log::warn!(
                "provider rate limited {} symbols, pausing requests for {}s",
                inner.rate_limited.len(),
                self.cooldown.as_secs()
            );
            inner.state = BreakerState::Open {
                tripped_at: Instant::now(),
            };
        }
    }

    /// Open immediately (403 Forbidden).
    pub fn trip(&self) {
        self.lock().state = BreakerState::Open {
            tripped_at: Instant::now(),
        };
    }

    pub fn remaining_cooldown(&self) -> Duration {
        match self.lock().state {
            BreakerState::Closed => Duration::ZERO,
            BreakerState::Open { tripped_at } => self.cooldown.saturating_sub(tripped_at.elapsed()),
        }
    }
}
