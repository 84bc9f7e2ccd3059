// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Sliding-window rate limiter for contact form submissions.
//!
//! Each caller identifier maps to the timestamps of its accepted attempts
//! inside a trailing window (3 attempts / 15 minutes by default). Entries
//! older than the window are pruned lazily on every check; idle keys are
//! never evicted, so key cardinality grows with unique-origin traffic.
//! State is process-local and resets on restart — this limiter is
//! advisory, not a durable quota.

use crate::config::RateLimitConfig;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Result of a rate limit check.
#[derive(Debug, Clone)]
pub enum RateLimitResult {
    /// Attempt recorded and allowed
    Allowed {
        /// Remaining attempts in the current window
        remaining: u32,
    },
    /// Attempt rejected
    Limited {
        /// Time until the oldest in-window attempt expires
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Thread-safe sliding-window rate limiter keyed by caller identifier.
///
/// The write lock serializes the read-modify-write of a key's timestamp
/// sequence, so concurrent requests from the same identifier cannot
/// undercount.
pub struct RateLimiter {
    config: RateLimitConfig,
    attempts: Arc<RwLock<HashMap<String, Vec<Instant>>>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            attempts: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Check and record an attempt for the given caller identifier.
    ///
    /// The window is re-evaluated per request relative to now; there is no
    /// hard reset point.
    pub async fn check(&self, caller: &str) -> RateLimitResult {
        let now = Instant::now();
        let window = self.config.window_duration();

        let mut attempts = self.attempts.write().await;
        let timestamps = attempts.entry(caller.to_string()).or_default();

        timestamps.retain(|t| now.duration_since(*t) < window);

        if timestamps.len() >= self.config.max_attempts as usize {
            // Oldest surviving timestamp is what the caller waits on
            let retry_after = timestamps
                .first()
                .map(|t| window.saturating_sub(now.duration_since(*t)))
                .unwrap_or(window);
            debug!(caller, ?retry_after, "Submission rate limit exceeded");
            return RateLimitResult::Limited { retry_after };
        }

        timestamps.push(now);
        let remaining = self.config.max_attempts - timestamps.len() as u32;
        debug!(caller, remaining, "Submission attempt recorded");
        RateLimitResult::Allowed { remaining }
    }

    /// Number of tracked caller identifiers (test/diagnostic use).
    pub async fn tracked_callers(&self) -> usize {
        self.attempts.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_attempts: u32, window_secs: u64) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            max_attempts,
            window_secs,
        })
    }

    #[tokio::test]
    async fn allows_up_to_ceiling_then_limits() {
        let limiter = limiter(3, 900);

        for i in 0..3 {
            let result = limiter.check("203.0.113.7").await;
            assert!(result.is_allowed(), "attempt {} should be allowed", i + 1);
        }

        match limiter.check("203.0.113.7").await {
            RateLimitResult::Limited { retry_after } => {
                assert!(retry_after <= Duration::from_secs(900));
            }
            RateLimitResult::Allowed { .. } => panic!("4th attempt should be limited"),
        }
    }

    #[tokio::test]
    async fn callers_are_independent() {
        let limiter = limiter(3, 900);

        for _ in 0..3 {
            assert!(limiter.check("first").await.is_allowed());
        }
        assert!(!limiter.check("first").await.is_allowed());

        // A different identifier has its own window
        assert!(limiter.check("second").await.is_allowed());
    }

    #[tokio::test]
    async fn window_expiry_frees_a_slot() {
        let limiter = limiter(2, 1);

        assert!(limiter.check("unknown").await.is_allowed());
        assert!(limiter.check("unknown").await.is_allowed());
        assert!(!limiter.check("unknown").await.is_allowed());

        tokio::time::sleep(Duration::from_millis(1100)).await;

        // Both earlier attempts have left the trailing window
        assert!(limiter.check("unknown").await.is_allowed());
    }

    #[tokio::test]
    async fn remaining_counts_down() {
        let limiter = limiter(3, 900);

        match limiter.check("x").await {
            RateLimitResult::Allowed { remaining } => assert_eq!(remaining, 2),
            _ => panic!("should be allowed"),
        }
        match limiter.check("x").await {
            RateLimitResult::Allowed { remaining } => assert_eq!(remaining, 1),
            _ => panic!("should be allowed"),
        }
    }

    #[tokio::test]
    async fn keys_are_created_lazily_and_never_evicted() {
        let limiter = limiter(3, 900);
        assert_eq!(limiter.tracked_callers().await, 0);

        limiter.check("a").await;
        limiter.check("b").await;
        assert_eq!(limiter.tracked_callers().await, 2);
    }
}
