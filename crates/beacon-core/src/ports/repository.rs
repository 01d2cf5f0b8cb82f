use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Admin, Site, Visit};
use crate::error::RepoError;

/// Site registry. The ingestion pipeline only reads it (`find_by_id`);
/// writes happen through the admin surface.
#[async_trait]
pub trait SiteRepository: Send + Sync {
    /// Find a site by its unique ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Site>, RepoError>;

    /// All registered sites.
    async fn find_all(&self) -> Result<Vec<Site>, RepoError>;

    /// Persist a new site.
    async fn save(&self, site: Site) -> Result<Site, RepoError>;
}

/// Append-only visit sink. The ingestion pipeline is the sole writer;
/// there is no update or delete surface.
///
/// Ordering across concurrent appends is not guaranteed - readers sort by
/// each visit's own `timestamp`, not insertion order.
#[async_trait]
pub trait VisitStore: Send + Sync {
    /// Durably record one visit. Must be safe under concurrent callers.
    async fn append(&self, visit: Visit) -> Result<Visit, RepoError>;

    /// All visits, newest first.
    async fn find_recent(&self) -> Result<Vec<Visit>, RepoError>;

    /// Visits for one site, newest first.
    async fn find_by_site(&self, site_id: Uuid) -> Result<Vec<Visit>, RepoError>;
}

/// Admin account repository.
#[async_trait]
pub trait AdminRepository: Send + Sync {
    /// Find an admin by ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Admin>, RepoError>;

    /// Find an admin by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<Admin>, RepoError>;

    /// Persist an admin (create or update, e.g. a password change).
    async fn save(&self, admin: Admin) -> Result<Admin, RepoError>;

    /// Number of admin accounts; drives first-start bootstrapping.
    async fn count(&self) -> Result<u64, RepoError>;
}
