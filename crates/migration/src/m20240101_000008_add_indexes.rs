//! Secondary indexes for the foreign-key traversal paths
//! (owner -> company, company -> products, product -> media).
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_user_company_id")
                    .table(User::Table)
                    .col(User::CompanyId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_product_company_id")
                    .table(Product::Table)
                    .col(Product::CompanyId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_product_image_product_id")
                    .table(ProductImage::Table)
                    .col(ProductImage::ProductId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_social_network_product_id")
                    .table(SocialNetwork::Table)
                    .col(SocialNetwork::ProductId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_social_network_product_id").table(SocialNetwork::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_product_image_product_id").table(ProductImage::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_product_company_id").table(Product::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_user_company_id").table(User::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum User { Table, CompanyId }

#[derive(DeriveIden)]
enum Product { Table, CompanyId }

#[derive(DeriveIden)]
enum ProductImage { Table, ProductId }

#[derive(DeriveIden)]
enum SocialNetwork { Table, ProductId }
