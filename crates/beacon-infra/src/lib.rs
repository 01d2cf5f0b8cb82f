//! # Beacon Infrastructure
//!
//! Concrete implementations of the ports defined in `beacon-core`.
//! This crate contains the visit store, site registry, rate limiter,
//! cache, and auth service integrations.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL persistence via SeaORM
//! - `auth` - JWT + Argon2 authentication
//! - `redis` - Redis support for cache and rate limiting

pub mod cache;
pub mod database;
pub mod rate_limit;

#[cfg(feature = "auth")]
pub mod auth;

// Re-exports - In-Memory
pub use cache::InMemoryCache;
pub use database::{
    CachedSiteRepository, InMemoryAdminRepository, InMemorySiteRepository, InMemoryVisitStore,
};
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig};

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtTokenService};

// Re-exports - Postgres
#[cfg(feature = "postgres")]
pub use database::{PostgresAdminRepository, PostgresSiteRepository, PostgresVisitStore};

// Re-exports - Redis
#[cfg(feature = "redis")]
pub use cache::{RedisCache, RedisConfig};
#[cfg(feature = "redis")]
pub use rate_limit::{RedisRateLimitConfig, RedisRateLimiter};
