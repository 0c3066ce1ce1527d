//! Sliding-window limiter for outbound upstream requests
//!
//! The limiter is advisory: it answers whether one more request right now
//! would exceed the quota, it never blocks. Callers check
//! [`RateLimiter::is_at_rate_limit`] and then record the request with
//! [`RateLimiter::add_request_time`] immediately before dispatch.
//!
//! Time is always passed in; the limiter never reads the wall clock.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};

/// At most `requests` calls per sliding `window`
#[derive(Debug)]
pub struct RateLimiter {
    /// Every request instant in arrival order. Never pruned; old entries
    /// simply stop mattering once more than `requests` newer ones exist.
    history: Mutex<Vec<DateTime<Utc>>>,
    requests: usize,
    window: Duration,
}

impl RateLimiter {
    /// `requests` must be at least 1 (enforced by config validation)
    pub fn new(requests: usize, window: Duration) -> Self {
        Self {
            history: Mutex::new(Vec::with_capacity(requests)),
            requests,
            window,
        }
    }

    pub fn add_request_time(&self, now: DateTime<Utc>) {
        self.lock().push(now);
    }

    /// True if the `requests`-th most recent request is still inside the window
    pub fn is_at_rate_limit(&self, now: DateTime<Utc>) -> bool {
        let history = self.lock();
        self.saturated(&history, now)
    }

    /// Check and record under one lock; returns false (recording nothing)
    /// when the quota is used up
    pub fn try_acquire(&self, now: DateTime<Utc>) -> bool {
        let mut history = self.lock();

        if self.saturated(&history, now) {
            return false;
        }

        history.push(now);
        true
    }

    fn saturated(&self, history: &[DateTime<Utc>], now: DateTime<Utc>) -> bool {
        if self.requests == 0 || history.len() < self.requests {
            return false;
        }

        let oldest_in_quota = history[history.len() - self.requests];
        now - oldest_in_quota < self.window
    }

    pub fn request_count(&self) -> usize {
        self.lock().len()
    }

    // A panic while holding the lock cannot leave a Vec<DateTime> half-written
    fn lock(&self) -> MutexGuard<'_, Vec<DateTime<Utc>>> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
