//! Create model_preferences table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ModelPreference::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ModelPreference::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ModelPreference::UserId).string().not_null())
                    .col(
                        ColumnDef::new(ModelPreference::Provider)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ModelPreference::ModelId).string().not_null())
                    .col(
                        ColumnDef::new(ModelPreference::IsCustom)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ModelPreference::UpdatedAt)
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
                    .name("uq_model_preferences_user_provider")
                    .table(ModelPreference::Table)
                    .col(ModelPreference::UserId)
                    .col(ModelPreference::Provider)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ModelPreference::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ModelPreference {
    #[sea_orm(iden = "model_preferences")]
    Table,
    Id,
    UserId,
    Provider,
    ModelId,
    IsCustom,
    UpdatedAt,
}
