//! Visit entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "visits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub site_id: Uuid,
    pub timestamp: DateTimeWithTimeZone,
    pub user_agent: String,
    pub ip: String,
    pub referrer: String,
    pub language: String,
    pub screen_size: String,
    pub pixel_ratio: String,
    pub viewport: String,
    pub platform: String,
    pub browser_name: String,
    pub browser_version: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Visit.
impl From<Model> for beacon_core::domain::Visit {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            site_id: model.site_id,
            timestamp: model.timestamp.into(),
            user_agent: model.user_agent,
            ip: model.ip,
            referrer: model.referrer,
            language: model.language,
            screen_size: model.screen_size,
            pixel_ratio: model.pixel_ratio,
            viewport: model.viewport,
            platform: model.platform,
            browser_name: model.browser_name,
            browser_version: model.browser_version,
        }
    }
}

/// Conversion from Domain Visit to SeaORM ActiveModel.
impl From<beacon_core::domain::Visit> for ActiveModel {
    fn from(visit: beacon_core::domain::Visit) -> Self {
        Self {
            id: Set(visit.id),
            site_id: Set(visit.site_id),
            timestamp: Set(visit.timestamp.into()),
            user_agent: Set(visit.user_agent),
            ip: Set(visit.ip),
            referrer: Set(visit.referrer),
            language: Set(visit.language),
            screen_size: Set(visit.screen_size),
            pixel_ratio: Set(visit.pixel_ratio),
            viewport: Set(visit.viewport),
            platform: Set(visit.platform),
            browser_name: Set(visit.browser_name),
            browser_version: Set(visit.browser_version),
        }
    }
}
