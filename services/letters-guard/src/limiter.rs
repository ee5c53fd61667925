// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window rate limiter keyed by client identity.
//!
//! Each key gets a window of `window_ms` starting at its first request.
//! Up to `max_requests` are accepted inside the window; after that every
//! request is refused until the window expires, at which point the quota
//! resets in full. A client can therefore land up to twice the quota across
//! a window boundary.
//!
//! Time is read from `tokio::time::Instant` so tests can pause and advance
//! the clock.

use crate::config::RateLimitConfig;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

/// Outcome of a single `check_and_consume` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    /// Whether the request may proceed
    pub allowed: bool,
    /// Requests still available in the current window
    pub remaining: u32,
    /// Time until the window resets (zero when allowed)
    pub retry_after: Duration,
}

impl RateDecision {
    fn allowed(remaining: u32) -> Self {
        Self {
            allowed: true,
            remaining,
            retry_after: Duration::ZERO,
        }
    }

    fn limited(retry_after: Duration) -> Self {
        Self {
            allowed: false,
            remaining: 0,
            retry_after,
        }
    }
}

/// Per-key counting window.
#[derive(Debug, Clone, Copy)]
struct RateWindow {
    /// Requests accepted in this window
    count: u32,
    /// When the window expires
    reset_at: Instant,
}

impl RateWindow {
    fn is_expired(&self, now: Instant) -> bool {
        now > self.reset_at
    }
}

/// Thread-safe fixed-window rate limiter.
///
/// Cloning shares the underlying state.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: Arc<RwLock<HashMap<String, RateWindow>>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Record one request for `key` and report whether it is allowed.
    ///
    /// The read-modify-write runs under the write guard, so concurrent
    /// callers sharing a key cannot push its count past `max_requests`.
    pub async fn check_and_consume(&self, key: &str) -> RateDecision {
        let now = Instant::now();
        let max = self.config.max_requests;
        let mut windows = self.windows.write().await;

        if let Some(window) = windows.get_mut(key).filter(|w| !w.is_expired(now)) {
            if window.count >= max {
                let retry_after = window.reset_at.saturating_duration_since(now);
                debug!(key, ?retry_after, "Rate window exhausted");
                return RateDecision::limited(retry_after);
            }
            window.count += 1;
            return RateDecision::allowed(max - window.count);
        }

        // Unseen or expired key: start a fresh window
        if max == 0 {
            return RateDecision::limited(self.config.window_duration());
        }
        windows.insert(
            key.to_string(),
            RateWindow {
                count: 1,
                reset_at: now + self.config.window_duration(),
            },
        );
        RateDecision::allowed(max - 1)
    }

    /// Drop windows that have expired. Returns how many were removed.
    pub async fn cleanup(&self) -> usize {
        let now = Instant::now();
        let mut windows = self.windows.write().await;
        let before = windows.len();
        windows.retain(|_, window| !window.is_expired(now));
        before - windows.len()
    }

    /// Number of keys currently tracked.
    pub async fn len(&self) -> usize {
        self.windows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.windows.read().await.is_empty()
    }

    /// Forget every key.
    pub async fn reset(&self) {
        self.windows.write().await.clear();
    }
}
