//! Read-through cache in front of the site registry.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use beacon_core::domain::Site;
use beacon_core::error::RepoError;
use beacon_core::ports::{Cache, SiteRepository};

/// Site registry decorator that caches `find_by_id` hits.
///
/// Every beacon request validates its site against the registry; this keeps
/// the hot lookup off the database. Only positive results are cached, with a
/// short TTL, so a freshly created site is trackable immediately and a
/// deleted one goes stale for at most the TTL. Cache failures degrade to the
/// inner repository - the cache is an optimization, never a gate.
pub struct CachedSiteRepository {
    inner: Arc<dyn SiteRepository>,
    cache: Arc<dyn Cache>,
    ttl: Duration,
}

impl CachedSiteRepository {
    pub fn new(inner: Arc<dyn SiteRepository>, cache: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self { inner, cache, ttl }
    }

    fn cache_key(id: Uuid) -> String {
        format!("site:{id}")
    }
}

#[async_trait]
impl SiteRepository for CachedSiteRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Site>, RepoError> {
        let key = Self::cache_key(id);

        if let Some(raw) = self.cache.get(&key).await {
            match serde_json::from_str::<Site>(&raw) {
                Ok(site) => return Ok(Some(site)),
                Err(e) => {
                    tracing::debug!(error = %e, "Discarding undecodable cached site");
                    let _ = self.cache.delete(&key).await;
                }
            }
        }

        let site = self.inner.find_by_id(id).await?;

        if let Some(site) = &site {
            if let Ok(raw) = serde_json::to_string(site) {
                if let Err(e) = self.cache.set(&key, &raw, Some(self.ttl)).await {
                    tracing::debug!(error = %e, "Failed to cache site lookup");
                }
            }
        }

        Ok(site)
    }

    async fn find_all(&self) -> Result<Vec<Site>, RepoError> {
        self.inner.find_all().await
    }

    async fn save(&self, site: Site) -> Result<Site, RepoError> {
        let saved = self.inner.save(site).await?;
        // Drop any stale entry under this id.
        let _ = self.cache.delete(&Self::cache_key(saved.id)).await;
        Ok(saved)
    }
}
