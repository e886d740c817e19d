//! Create `social_network` table: per-product social links.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SocialNetwork::Table)
                    .if_not_exists()
                    .col(pk_auto(SocialNetwork::Id))
                    .col(integer(SocialNetwork::ProductId).not_null())
                    .col(string_len(SocialNetwork::Name, 64).not_null())
                    .col(string_len(SocialNetwork::Url, 512).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_social_network_product")
                            .from(SocialNetwork::Table, SocialNetwork::ProductId)
                            .to(Product::Table, Product::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(SocialNetwork::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum SocialNetwork { Table, Id, ProductId, Name, Url }

#[derive(DeriveIden)]
enum Product { Table, Id }
