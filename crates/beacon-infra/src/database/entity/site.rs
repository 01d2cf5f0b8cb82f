//! Site entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sites")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub url: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Site.
impl From<Model> for beacon_core::domain::Site {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            url: model.url,
            created_at: model.created_at.into(),
        }
    }
}

/// Conversion from Domain Site to SeaORM ActiveModel.
impl From<beacon_core::domain::Site> for ActiveModel {
    fn from(site: beacon_core::domain::Site) -> Self {
        Self {
            id: Set(site.id),
            name: Set(site.name),
            url: Set(site.url),
            created_at: Set(site.created_at.into()),
        }
    }
}
