//! PostgreSQL repository implementations.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbConn, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use beacon_core::domain::{Admin, Site, Visit};
use beacon_core::error::RepoError;
use beacon_core::ports::{AdminRepository, SiteRepository, VisitStore};

use super::entity::admin::{self, Entity as AdminEntity};
use super::entity::site::{self, Entity as SiteEntity};
use super::entity::visit::{self, Entity as VisitEntity};

fn query_err(e: sea_orm::DbErr) -> RepoError {
    let err_str = e.to_string();
    if err_str.contains("duplicate") || err_str.contains("unique") {
        RepoError::Constraint("Entity already exists".to_string())
    } else {
        RepoError::Query(err_str)
    }
}

/// PostgreSQL site registry.
pub struct PostgresSiteRepository {
    db: Arc<DbConn>,
}

impl PostgresSiteRepository {
    pub fn new(db: impl Into<Arc<DbConn>>) -> Self {
        Self { db: db.into() }
    }
}

#[async_trait]
impl SiteRepository for PostgresSiteRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Site>, RepoError> {
        let result = SiteEntity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_all(&self) -> Result<Vec<Site>, RepoError> {
        let result = SiteEntity::find()
            .order_by_asc(site::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn save(&self, site: Site) -> Result<Site, RepoError> {
        // Sites are immutable after creation - always an insert.
        let model = site::ActiveModel::from(site)
            .insert(&*self.db)
            .await
            .map_err(query_err)?;

        Ok(model.into())
    }
}

/// PostgreSQL visit store. One INSERT per visit; the row is durable before
/// the caller sends its response.
pub struct PostgresVisitStore {
    db: Arc<DbConn>,
}

impl PostgresVisitStore {
    pub fn new(db: impl Into<Arc<DbConn>>) -> Self {
        Self { db: db.into() }
    }
}

#[async_trait]
impl VisitStore for PostgresVisitStore {
    async fn append(&self, v: Visit) -> Result<Visit, RepoError> {
        let model = visit::ActiveModel::from(v)
            .insert(&*self.db)
            .await
            .map_err(query_err)?;

        Ok(model.into())
    }

    async fn find_recent(&self) -> Result<Vec<Visit>, RepoError> {
        let result = VisitEntity::find()
            .order_by_desc(visit::Column::Timestamp)
            .all(&*self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_site(&self, site_id: Uuid) -> Result<Vec<Visit>, RepoError> {
        let result = VisitEntity::find()
            .filter(visit::Column::SiteId.eq(site_id))
            .order_by_desc(visit::Column::Timestamp)
            .all(&*self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

/// PostgreSQL admin repository.
pub struct PostgresAdminRepository {
    db: Arc<DbConn>,
}

impl PostgresAdminRepository {
    pub fn new(db: impl Into<Arc<DbConn>>) -> Self {
        Self { db: db.into() }
    }
}

#[async_trait]
impl AdminRepository for PostgresAdminRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Admin>, RepoError> {
        let result = AdminEntity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Admin>, RepoError> {
        let result = AdminEntity::find()
            .filter(admin::Column::Username.eq(username))
            .one(&*self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn save(&self, a: Admin) -> Result<Admin, RepoError> {
        // Covers both bootstrap creation and password changes. There is a
        // single operator account, so the read-then-write is uncontended.
        let existing = AdminEntity::find_by_id(a.id)
            .one(&*self.db)
            .await
            .map_err(query_err)?;

        let active = admin::ActiveModel::from(a);
        let model = if existing.is_some() {
            active.update(&*self.db).await.map_err(query_err)?
        } else {
            active.insert(&*self.db).await.map_err(query_err)?
        };

        Ok(model.into())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        AdminEntity::find().count(&*self.db).await.map_err(query_err)
    }
}
