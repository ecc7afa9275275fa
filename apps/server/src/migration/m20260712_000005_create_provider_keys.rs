//! Create provider_keys table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProviderKey::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProviderKey::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProviderKey::UserId).string().not_null())
                    .col(ColumnDef::new(ProviderKey::Provider).string().not_null())
                    .col(
                        ColumnDef::new(ProviderKey::EncryptedKey)
                            .binary()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ProviderKey::KeyName).string())
                    .col(
                        ColumnDef::new(ProviderKey::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(ProviderKey::LastUsedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(ProviderKey::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // retrieve() looks up the single active row for a (user, provider) pair
        manager
            .create_index(
                Index::create()
                    .name("idx_provider_keys_user_provider_active")
                    .table(ProviderKey::Table)
                    .col(ProviderKey::UserId)
                    .col(ProviderKey::Provider)
                    .col(ProviderKey::IsActive)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProviderKey::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ProviderKey {
    #[sea_orm(iden = "provider_keys")]
    Table,
    Id,
    UserId,
    Provider,
    EncryptedKey,
    KeyName,
    IsActive,
    LastUsedAt,
    CreatedAt,
}
