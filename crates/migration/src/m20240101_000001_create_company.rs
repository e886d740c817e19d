//! Create `company` table.
//!
//! Banner/logo URLs are nullable; they are patched only after the matching
//! blob has been written.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Company::Table)
                    .if_not_exists()
                    .col(pk_auto(Company::Id))
                    .col(string_len(Company::Title, 128).not_null())
                    .col(text(Company::Description).not_null())
                    .col(timestamp_with_time_zone(Company::DateCreated).not_null())
                    .col(ColumnDef::new(Company::BannerUrl).string_len(512).null())
                    .col(ColumnDef::new(Company::LogoUrl).string_len(512).null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Company::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Company { Table, Id, Title, Description, DateCreated, BannerUrl, LogoUrl }
