//! In-memory per-key sliding-window rate limiter.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use beacon_core::ports::{RateLimitError, RateLimitResult, RateLimiter};

/// In-memory rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: u32,
    /// Window duration.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 60,
            window: Duration::from_secs(60),
        }
    }
}

/// Sliding-window rate limiter keyed by client identity.
///
/// Each key holds the timestamps of its calls inside the trailing window.
/// A check appends its own timestamp, drops entries older than
/// `now - window`, then admits iff the remaining count is within the limit.
/// The window advances on rejected calls too, so a client hammering past
/// the limit stays rejected until it actually backs off.
///
/// Limits are per-process, not distributed across instances.
pub struct InMemoryRateLimiter {
    windows: Mutex<HashMap<String, VecDeque<Instant>>>,
    config: RateLimitConfig,
}

impl InMemoryRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            config,
        }
    }

    pub fn from_env() -> Self {
        let config = RateLimitConfig {
            max_requests: std::env::var("RATE_LIMIT_MAX_REQUESTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(60),
            window: Duration::from_secs(
                std::env::var("RATE_LIMIT_WINDOW_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
        };
        Self::new(config)
    }

    /// Drop keys whose entries have all aged out of the window.
    /// Returns the number of keys removed. Called from a background sweep;
    /// skipping it only costs memory, never correctness.
    pub async fn prune_stale(&self) -> usize {
        let mut windows = self.windows.lock().await;
        let Some(cutoff) = Instant::now().checked_sub(self.config.window) else {
            return 0;
        };

        let before = windows.len();
        windows.retain(|_, entries| entries.back().is_some_and(|&last| last > cutoff));
        before - windows.len()
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check(&self, key: &str) -> Result<RateLimitResult, RateLimitError> {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        let entries = windows.entry(key.to_string()).or_default();

        // The current call counts toward the tally before the decision.
        entries.push_back(now);

        if let Some(cutoff) = now.checked_sub(self.config.window) {
            while entries.front().is_some_and(|&t| t <= cutoff) {
                entries.pop_front();
            }
        }

        let count = entries.len() as u32;
        let reset_after = entries
            .front()
            .map(|&oldest| (oldest + self.config.window).saturating_duration_since(now))
            .unwrap_or_default();

        Ok(RateLimitResult {
            allowed: count <= self.config.max_requests,
            remaining: self.config.max_requests.saturating_sub(count),
            reset_after,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, window: Duration) -> InMemoryRateLimiter {
        InMemoryRateLimiter::new(RateLimitConfig {
            max_requests,
            window,
        })
    }

    #[tokio::test]
    async fn admits_up_to_the_limit_and_rejects_the_next_call() {
        let limiter = limiter(60, Duration::from_secs(60));

        for i in 1..=60 {
            let res = limiter.check("10.0.0.1").await.unwrap();
            assert!(res.allowed, "call {i} should be admitted");
        }

        let res = limiter.check("10.0.0.1").await.unwrap();
        assert!(!res.allowed, "61st call inside the window must be rejected");
        assert_eq!(res.remaining, 0);
    }

    #[tokio::test]
    async fn window_expiry_restores_admission() {
        let limiter = limiter(2, Duration::from_millis(200));

        assert!(limiter.check("k").await.unwrap().allowed);
        assert!(limiter.check("k").await.unwrap().allowed);
        assert!(!limiter.check("k").await.unwrap().allowed);

        tokio::time::sleep(Duration::from_millis(300)).await;

        assert!(
            limiter.check("k").await.unwrap().allowed,
            "admission must resume once old entries expire"
        );
    }

    #[tokio::test]
    async fn rejected_calls_still_count_toward_the_window() {
        let limiter = limiter(2, Duration::from_millis(500));

        assert!(limiter.check("k").await.unwrap().allowed);
        assert!(limiter.check("k").await.unwrap().allowed);
        assert!(!limiter.check("k").await.unwrap().allowed);

        // Not long enough for anything to expire; the rejected call above
        // has already been added to the tally.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!limiter.check("k").await.unwrap().allowed);
    }

    #[tokio::test]
    async fn keys_are_limited_independently() {
        let limiter = limiter(1, Duration::from_secs(60));

        assert!(limiter.check("10.0.0.1").await.unwrap().allowed);
        assert!(!limiter.check("10.0.0.1").await.unwrap().allowed);
        assert!(limiter.check("10.0.0.2").await.unwrap().allowed);
    }

    #[tokio::test]
    async fn concurrent_checks_on_one_key_lose_no_entries() {
        use std::sync::Arc;

        let limiter = Arc::new(limiter(100, Duration::from_secs(60)));

        let mut handles = Vec::new();
        for _ in 0..50 {
            let limiter = limiter.clone();
            handles.push(tokio::spawn(
                async move { limiter.check("shared").await.unwrap() },
            ));
        }
        for handle in handles {
            assert!(handle.await.unwrap().allowed);
        }

        // All 50 calls must be in the tally: 50 more admits, then rejection.
        for _ in 0..50 {
            assert!(limiter.check("shared").await.unwrap().allowed);
        }
        assert!(!limiter.check("shared").await.unwrap().allowed);
    }

    #[tokio::test]
    async fn prune_drops_only_fully_expired_keys() {
        let limiter = limiter(5, Duration::from_millis(200));

        limiter.check("old").await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        limiter.check("fresh").await.unwrap();

        assert_eq!(limiter.prune_stale().await, 1);
        assert_eq!(limiter.prune_stale().await, 0);
    }
}
