//! Per-address sliding-window limiter for login attempts.
//!
//! # Responsibilities
//! - Track login attempts per client IP
//! - Reject the 6th attempt within a 15-minute window
//!
//! # Design Decisions
//! - Sliding window: each check prunes timestamps older than the window
//!   before counting, so blocked clients recover as attempts age out
//! - Attempts are counted whether or not the credentials were correct

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

const LOGIN_WINDOW: Duration = Duration::from_secs(15 * 60);
const LOGIN_MAX_ATTEMPTS: usize = 5;

/// Sliding-window counter keyed by client address.
pub struct LoginRateLimiter {
    attempts: Mutex<HashMap<String, Vec<Instant>>>,
    window: Duration,
    max_attempts: usize,
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginRateLimiter {
    pub fn new() -> Self {
        Self::with_limits(LOGIN_WINDOW, LOGIN_MAX_ATTEMPTS)
    }

    pub fn with_limits(window: Duration, max_attempts: usize) -> Self {
        Self {
            attempts: Mutex::new(HashMap::new()),
            window,
            max_attempts,
        }
    }

    /// Record an attempt for `key` and return whether it is allowed.
    pub fn check(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut attempts = self.attempts.lock().expect("rate limiter mutex poisoned");

        // Prune the whole map, not just this key's history; addresses whose
        // window has fully aged out must not pin map entries forever.
        attempts.retain(|_, history| {
            history.retain(|at| now.duration_since(*at) < self.window);
            !history.is_empty()
        });

        let history = attempts.entry(key.to_string()).or_default();
        if history.len() >= self.max_attempts {
            return false;
        }
        history.push(now);
        true
    }

    /// Number of addresses currently holding live attempts.
    pub fn tracked_addresses(&self) -> usize {
        self.attempts
            .lock()
            .expect("rate limiter mutex poisoned")
            .len()
    }
}
