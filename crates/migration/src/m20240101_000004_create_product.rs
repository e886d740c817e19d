//! Create `product` table with FKs to `company` and `genre`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Product::Table)
                    .if_not_exists()
                    .col(pk_auto(Product::Id))
                    .col(integer(Product::CompanyId).not_null())
                    .col(ColumnDef::new(Product::GenreId).integer().null())
                    .col(string_len(Product::Title, 128).not_null())
                    .col(text(Product::Description).not_null())
                    .col(timestamp_with_time_zone(Product::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_company")
                            .from(Product::Table, Product::CompanyId)
                            .to(Company::Table, Company::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_genre")
                            .from(Product::Table, Product::GenreId)
                            .to(Genre::Table, Genre::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Product::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Product { Table, Id, CompanyId, GenreId, Title, Description, CreatedAt }

#[derive(DeriveIden)]
enum Company { Table, Id }

#[derive(DeriveIden)]
enum Genre { Table, Id }
