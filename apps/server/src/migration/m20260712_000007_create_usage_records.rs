//! Create usage_records table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UsageRecord::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UsageRecord::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UsageRecord::UserId).string().not_null())
                    .col(ColumnDef::new(UsageRecord::ProjectId).uuid())
                    .col(ColumnDef::new(UsageRecord::Provider).string().not_null())
                    .col(ColumnDef::new(UsageRecord::Model).string().not_null())
                    .col(
                        ColumnDef::new(UsageRecord::TokensUsed)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UsageRecord::CostUsd)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(UsageRecord::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_usage_records_user_id")
                    .table(UsageRecord::Table)
                    .col(UsageRecord::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UsageRecord::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UsageRecord {
    #[sea_orm(iden = "usage_records")]
    Table,
    Id,
    UserId,
    ProjectId,
    Provider,
    Model,
    TokensUsed,
    CostUsd,
    CreatedAt,
}
