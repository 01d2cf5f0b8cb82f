//! Rate limiting port.

use async_trait::async_trait;
use std::time::Duration;

/// Per-key sliding-window rate limiter guarding the ingestion endpoint.
///
/// `check` is called once per ingestion attempt, before any other work. The
/// key's window is mutated on every call - the call itself counts toward the
/// tally whether or not it is admitted, so a client stuck over the limit
/// keeps accumulating entries and regains admission only once old entries
/// age out of the window (self-healing, no manual reset).
///
/// Updates for a single key must serialize: concurrent requests from the
/// same client must not race and drop window entries.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Record the request against `key` and decide admission.
    /// Returns `allowed: true` iff the window, including this call,
    /// holds at most the configured limit.
    async fn check(&self, key: &str) -> Result<RateLimitResult, RateLimitError>;
}

/// Result of a rate limit check.
#[derive(Debug, Clone)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_after: Duration,
}

/// Rate limit errors.
///
/// Callers on the ingestion path treat a backend error as a denial
/// (fail closed) rather than waving the request through.
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Backend error: {0}")]
    Backend(String),
}
