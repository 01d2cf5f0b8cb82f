//! Redis rate limiter implementation using a sorted-set sliding window.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Client, Script};

use beacon_core::ports::{RateLimitError, RateLimitResult, RateLimiter};

use crate::cache::RedisConfig;

/// Redis rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RedisRateLimitConfig {
    /// Redis connection config
    pub redis: RedisConfig,
    /// Maximum requests per window
    pub max_requests: u32,
    /// Window duration
    pub window: Duration,
    /// Key prefix for rate limit keys
    pub key_prefix: String,
}

impl Default for RedisRateLimitConfig {
    fn default() -> Self {
        Self {
            redis: RedisConfig::default(),
            max_requests: 60,
            window: Duration::from_secs(60),
            key_prefix: "ratelimit".to_string(),
        }
    }
}

impl RedisRateLimitConfig {
    pub fn from_env() -> Self {
        Self {
            redis: RedisConfig::from_env(),
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
            key_prefix: std::env::var("RATE_LIMIT_KEY_PREFIX")
                .unwrap_or_else(|_| "ratelimit".to_string()),
        }
    }
}

/// Redis-backed sliding-window rate limiter.
///
/// Each key is a sorted set of request timestamps (ms). One Lua script adds
/// the current call, drops entries older than the window, and reports the
/// count - the same mutate-then-decide semantics as the in-memory limiter,
/// shared across server instances.
pub struct RedisRateLimiter {
    conn: ConnectionManager,
    config: RedisRateLimitConfig,
    /// Lua script for the atomic add-prune-count round trip
    script: Script,
}

impl RedisRateLimiter {
    pub async fn new(config: RedisRateLimitConfig) -> Result<Self, RateLimitError> {
        let client = Client::open(config.redis.url.as_str())
            .map_err(|e| RateLimitError::Backend(e.to_string()))?;

        // Use timeout to prevent hanging if Redis is unreachable
        let conn_manager_fut = ConnectionManager::new(client);
        let conn = tokio::time::timeout(config.redis.connect_timeout, conn_manager_fut)
            .await
            .map_err(|_| RateLimitError::Backend("Connection timed out".to_string()))?
            .map_err(|e| RateLimitError::Backend(e.to_string()))?;

        // Returns: [count_in_window, oldest_score_ms]
        let script = Script::new(
            r#"
            local key = KEYS[1]
            local window_ms = tonumber(ARGV[1])
            local now_ms = tonumber(ARGV[2])
            local member = ARGV[3]

            redis.call('ZADD', key, now_ms, member)
            redis.call('ZREMRANGEBYSCORE', key, 0, now_ms - window_ms)
            redis.call('PEXPIRE', key, window_ms)

            local count = redis.call('ZCARD', key)
            local oldest = redis.call('ZRANGE', key, 0, 0, 'WITHSCORES')
            return {count, tonumber(oldest[2])}
            "#,
        );

        tracing::info!(url = %config.redis.url, "Connected to Redis rate limiter");

        Ok(Self {
            conn,
            config,
            script,
        })
    }

    /// Create from environment configuration.
    pub async fn from_env() -> Result<Self, RateLimitError> {
        Self::new(RedisRateLimitConfig::from_env()).await
    }

    fn make_key(&self, key: &str) -> String {
        format!("{}:{}", self.config.key_prefix, key)
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn check(&self, key: &str) -> Result<RateLimitResult, RateLimitError> {
        let redis_key = self.make_key(key);
        let mut conn = self.conn.clone();

        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| RateLimitError::Backend(e.to_string()))?
            .as_millis() as i64;
        // Unique member so simultaneous calls never collapse into one entry.
        let member = format!("{now_ms}-{}", uuid::Uuid::new_v4());

        let result: Vec<i64> = self
            .script
            .key(&redis_key)
            .arg(self.config.window.as_millis() as i64)
            .arg(now_ms)
            .arg(member)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| RateLimitError::Backend(e.to_string()))?;

        let count = result.first().copied().unwrap_or(1) as u32;
        let oldest_ms = result.get(1).copied().unwrap_or(now_ms);

        let allowed = count <= self.config.max_requests;
        let window_ms = self.config.window.as_millis() as i64;
        let reset_after =
            Duration::from_millis((oldest_ms + window_ms - now_ms).max(0) as u64);

        Ok(RateLimitResult {
            allowed,
            remaining: self.config.max_requests.saturating_sub(count),
            reset_after,
        })
    }
}
