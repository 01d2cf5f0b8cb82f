//! Application state - shared across all handlers.

use std::sync::Arc;
use std::time::Duration;

use beacon_core::domain::Admin;
use beacon_core::ports::{
    AdminRepository, Cache, PasswordService, RateLimiter, SiteRepository, VisitStore,
};
use beacon_infra::cache::InMemoryCache;
use beacon_infra::database::{
    CachedSiteRepository, InMemoryAdminRepository, InMemorySiteRepository, InMemoryVisitStore,
};
use beacon_infra::rate_limit::InMemoryRateLimiter;

use crate::config::AppConfig;

/// How long a positive site lookup may be served from cache.
const SITE_CACHE_TTL: Duration = Duration::from_secs(30);

/// How often the in-memory limiter sweeps fully-expired client windows.
const LIMITER_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub sites: Arc<dyn SiteRepository>,
    pub visits: Arc<dyn VisitStore>,
    pub admins: Arc<dyn AdminRepository>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig, password_service: &dyn PasswordService) -> Self {
        let cache = build_cache().await;

        #[cfg(feature = "postgres")]
        let (sites, visits, admins): (
            Arc<dyn SiteRepository>,
            Arc<dyn VisitStore>,
            Arc<dyn AdminRepository>,
        ) = {
            if let Some(db_config) = &config.database {
                match beacon_infra::database::connect(db_config).await {
                    Ok(conn) => {
                        // One pool shared by all three repositories.
                        let conn = Arc::new(conn);
                        (
                            Arc::new(beacon_infra::database::PostgresSiteRepository::new(
                                conn.clone(),
                            )),
                            Arc::new(beacon_infra::database::PostgresVisitStore::new(conn.clone())),
                            Arc::new(beacon_infra::database::PostgresAdminRepository::new(conn)),
                        )
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                        in_memory_repos()
                    }
                }
            } else {
                tracing::warn!(
                    "DATABASE_URL not set. Running without database (in-memory mode) - \
                     visits are lost on restart."
                );
                in_memory_repos()
            }
        };

        #[cfg(not(feature = "postgres"))]
        let (sites, visits, admins) = {
            if config.database.is_some() {
                tracing::warn!("DATABASE_URL is set but the postgres feature is disabled");
            }
            tracing::info!("Running without postgres feature - using in-memory repositories");
            in_memory_repos()
        };

        // Hot path: every beacon request validates its site here.
        let sites: Arc<dyn SiteRepository> =
            Arc::new(CachedSiteRepository::new(sites, cache, SITE_CACHE_TTL));

        let state = Self {
            sites,
            visits,
            admins,
        };

        state.bootstrap_default_admin(password_service).await;

        tracing::info!("Application state initialized");

        state
    }

    /// Create the default operator account on first start.
    async fn bootstrap_default_admin(&self, password_service: &dyn PasswordService) {
        let count = match self.admins.count().await {
            Ok(count) => count,
            Err(e) => {
                tracing::error!(error = %e, "Could not check for existing admin accounts");
                return;
            }
        };
        if count > 0 {
            return;
        }

        let hash = match password_service.hash("admin123") {
            Ok(hash) => hash,
            Err(e) => {
                tracing::error!(error = %e, "Could not hash default admin password");
                return;
            }
        };

        match self.admins.save(Admin::new("admin".to_string(), hash)).await {
            Ok(_) => {
                tracing::warn!(
                    "Default admin account created. Username: admin, Password: admin123"
                );
                tracing::warn!("Please change this password after your first login!");
            }
            Err(e) => tracing::error!(error = %e, "Could not create default admin account"),
        }
    }
}

fn in_memory_repos() -> (
    Arc<dyn SiteRepository>,
    Arc<dyn VisitStore>,
    Arc<dyn AdminRepository>,
) {
    (
        Arc::new(InMemorySiteRepository::new()),
        Arc::new(InMemoryVisitStore::new()),
        Arc::new(InMemoryAdminRepository::new()),
    )
}

async fn build_cache() -> Arc<dyn Cache> {
    #[cfg(feature = "redis")]
    if std::env::var("REDIS_URL").is_ok() {
        match beacon_infra::cache::RedisCache::from_env().await {
            Ok(cache) => return Arc::new(cache),
            Err(e) => {
                tracing::warn!(error = %e, "Redis cache unavailable, falling back to in-memory");
            }
        }
    }

    Arc::new(InMemoryCache::new())
}

/// Select the rate limiter backend and start its maintenance sweep.
pub async fn build_rate_limiter() -> Arc<dyn RateLimiter> {
    #[cfg(feature = "redis")]
    if std::env::var("REDIS_URL").is_ok() {
        match beacon_infra::rate_limit::RedisRateLimiter::from_env().await {
            Ok(limiter) => return Arc::new(limiter),
            Err(e) => {
                tracing::warn!(error = %e, "Redis rate limiter unavailable, falling back to in-memory");
            }
        }
    }

    let limiter = Arc::new(InMemoryRateLimiter::from_env());

    // Stale windows only cost memory; sweep them in the background.
    let sweep = limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(LIMITER_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = sweep.prune_stale().await;
            if removed > 0 {
                tracing::debug!(removed, "Pruned stale rate-limit windows");
            }
        }
    });

    limiter
}
