//! In-memory repository implementations.
//!
//! Used when `DATABASE_URL` is not configured, and by tests. Data is lost
//! on process restart - selecting these at startup is announced as
//! best-effort mode.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use beacon_core::domain::{Admin, Site, Visit};
use beacon_core::error::RepoError;
use beacon_core::ports::{AdminRepository, SiteRepository, VisitStore};

/// In-memory site registry.
#[derive(Default)]
pub struct InMemorySiteRepository {
    sites: RwLock<Vec<Site>>,
}

impl InMemorySiteRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SiteRepository for InMemorySiteRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Site>, RepoError> {
        let sites = self.sites.read().await;
        Ok(sites.iter().find(|s| s.id == id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Site>, RepoError> {
        Ok(self.sites.read().await.clone())
    }

    async fn save(&self, site: Site) -> Result<Site, RepoError> {
        let mut sites = self.sites.write().await;
        sites.push(site.clone());
        Ok(site)
    }
}

/// In-memory append-only visit store.
#[derive(Default)]
pub struct InMemoryVisitStore {
    visits: RwLock<Vec<Visit>>,
}

impl InMemoryVisitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut visits: Vec<Visit>) -> Vec<Visit> {
    visits.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    visits
}

#[async_trait]
impl VisitStore for InMemoryVisitStore {
    async fn append(&self, visit: Visit) -> Result<Visit, RepoError> {
        let mut visits = self.visits.write().await;
        visits.push(visit.clone());
        Ok(visit)
    }

    async fn find_recent(&self) -> Result<Vec<Visit>, RepoError> {
        Ok(newest_first(self.visits.read().await.clone()))
    }

    async fn find_by_site(&self, site_id: Uuid) -> Result<Vec<Visit>, RepoError> {
        let visits = self.visits.read().await;
        Ok(newest_first(
            visits
                .iter()
                .filter(|v| v.site_id == site_id)
                .cloned()
                .collect(),
        ))
    }
}

/// In-memory admin repository.
#[derive(Default)]
pub struct InMemoryAdminRepository {
    admins: RwLock<Vec<Admin>>,
}

impl InMemoryAdminRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AdminRepository for InMemoryAdminRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Admin>, RepoError> {
        let admins = self.admins.read().await;
        Ok(admins.iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Admin>, RepoError> {
        let admins = self.admins.read().await;
        Ok(admins.iter().find(|a| a.username == username).cloned())
    }

    async fn save(&self, admin: Admin) -> Result<Admin, RepoError> {
        let mut admins = self.admins.write().await;
        if let Some(existing) = admins.iter_mut().find(|a| a.id == admin.id) {
            *existing = admin.clone();
        } else {
            if admins.iter().any(|a| a.username == admin.username) {
                return Err(RepoError::Constraint("Entity already exists".to_string()));
            }
            admins.push(admin.clone());
        }
        Ok(admin)
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.admins.read().await.len() as u64)
    }
}
