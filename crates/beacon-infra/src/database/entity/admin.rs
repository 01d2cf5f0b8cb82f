//! Admin entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "admins")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Admin.
impl From<Model> for beacon_core::domain::Admin {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            password_hash: model.password_hash,
            created_at: model.created_at.into(),
        }
    }
}

/// Conversion from Domain Admin to SeaORM ActiveModel.
impl From<beacon_core::domain::Admin> for ActiveModel {
    fn from(admin: beacon_core::domain::Admin) -> Self {
        Self {
            id: Set(admin.id),
            username: Set(admin.username),
            password_hash: Set(admin.password_hash),
            created_at: Set(admin.created_at.into()),
        }
    }
}
