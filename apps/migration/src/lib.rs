//! Database migrations for the Beacon tracker.

pub use sea_orm_migration::prelude::*;

mod m20250601_000001_create_sites_table;
mod m20250601_000002_create_visits_table;
mod m20250601_000003_create_admins_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_sites_table::Migration),
            Box::new(m20250601_000002_create_visits_table::Migration),
            Box::new(m20250601_000003_create_admins_table::Migration),
        ]
    }
}
