//! Per-client fixed window rate limiter.
//!
//! Each client key gets a window of `window` length holding a request count.
//! The first request of a window resets the count to 1; later requests in the
//! same window increment it and are rejected once it exceeds the limit.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Whole seconds until the client's window resets, 0 when allowed
    pub retry_after_secs: u64,
}

impl RateLimitDecision {
    fn allow() -> Self {
        Self {
            allowed: true,
            retry_after_secs: 0,
        }
    }

    fn reject(retry_after_secs: u64) -> Self {
        Self {
            allowed: false,
            retry_after_secs,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct RateLimitWindow {
    count: u32,
    reset_at: Instant,
}

impl RateLimitWindow {
    fn has_elapsed(&self, now: Instant) -> bool {
        now > self.reset_at
    }
}

/// Fixed window limiter keyed by client identity.
///
/// The whole table sits behind one mutex so the read-increment-compare-write
/// on a window is atomic with respect to concurrent requests.
pub struct FixedWindowRateLimiter {
    windows: Mutex<HashMap<String, RateLimitWindow>>,
    max_requests: u32,
    window: Duration,
    /// Table size above which elapsed windows are purged
    max_clients: usize,
}

impl FixedWindowRateLimiter {
    /// Create a limiter allowing `max_requests` per `window` per client.
    pub fn new(max_requests: u32, window: Duration, max_clients: usize) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            max_requests: max_requests.max(1),
            window,
            max_clients,
        }
    }

    /// Count a request from `client_key` and decide whether it may proceed.
    pub fn check(&self, client_key: &str) -> RateLimitDecision {
        self.check_at(client_key, Instant::now())
    }

    /// Same as [`check`](Self::check) with an explicit clock reading.
    pub fn check_at(&self, client_key: &str, now: Instant) -> RateLimitDecision {
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(window) = windows.get_mut(client_key) {
            if !window.has_elapsed(now) {
                window.count = window.count.saturating_add(1);
                if window.count > self.max_requests {
                    let retry_after = ceil_secs(window.reset_at.saturating_duration_since(now));
                    debug!(
                        client = %client_key,
                        count = window.count,
                        retry_after_secs = retry_after,
                        "Client over rate limit"
                    );
                    return RateLimitDecision::reject(retry_after);
                }
                return RateLimitDecision::allow();
            }
        } else if self.max_clients > 0 && windows.len() >= self.max_clients {
            let before = windows.len();
            windows.retain(|_, w| !w.has_elapsed(now));
            warn!(
                removed = before - windows.len(),
                remaining = windows.len(),
                "Rate limiter table over capacity, purged elapsed windows"
            );
        }

        windows.insert(
            client_key.to_string(),
            RateLimitWindow {
                count: 1,
                reset_at: now + self.window,
            },
        );
        RateLimitDecision::allow()
    }

    /// Number of client windows currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

fn ceil_secs(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}
