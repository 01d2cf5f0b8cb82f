use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Visits::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Visits::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Visits::SiteId).uuid().not_null())
                    .col(
                        ColumnDef::new(Visits::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Visits::UserAgent).string().not_null())
                    .col(ColumnDef::new(Visits::Ip).string().not_null())
                    .col(ColumnDef::new(Visits::Referrer).string().not_null())
                    .col(ColumnDef::new(Visits::Language).string().not_null())
                    .col(ColumnDef::new(Visits::ScreenSize).string().not_null())
                    .col(ColumnDef::new(Visits::PixelRatio).string().not_null())
                    .col(ColumnDef::new(Visits::Viewport).string().not_null())
                    .col(ColumnDef::new(Visits::Platform).string().not_null())
                    .col(ColumnDef::new(Visits::BrowserName).string().not_null())
                    .col(ColumnDef::new(Visits::BrowserVersion).string().not_null())
                    .to_owned(),
            )
            .await?;

        // Reader surface filters by site and sorts newest first.
        manager
            .create_index(
                Index::create()
                    .name("idx_visits_site_id_timestamp")
                    .table(Visits::Table)
                    .col(Visits::SiteId)
                    .col(Visits::Timestamp)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Visits::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Visits {
    Table,
    Id,
    SiteId,
    Timestamp,
    UserAgent,
    Ip,
    Referrer,
    Language,
    ScreenSize,
    PixelRatio,
    Viewport,
    Platform,
    BrowserName,
    BrowserVersion,
}
