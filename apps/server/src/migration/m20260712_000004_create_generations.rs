//! Create generations table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Generation::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Generation::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Generation::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(Generation::UserId).string().not_null())
                    .col(ColumnDef::new(Generation::Prompt).text().not_null())
                    .col(ColumnDef::new(Generation::Response).text())
                    .col(ColumnDef::new(Generation::GeneratedFiles).json_binary())
                    .col(ColumnDef::new(Generation::ModelUsed).string().not_null())
                    .col(ColumnDef::new(Generation::Provider).string().not_null())
                    .col(
                        ColumnDef::new(Generation::Success)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Generation::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_generations_project")
                            .from(Generation::Table, Generation::ProjectId)
                            .to(Project::Table, Project::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // chat history replay fetches by project in creation order
        manager
            .create_index(
                Index::create()
                    .name("idx_generations_project_created")
                    .table(Generation::Table)
                    .col(Generation::ProjectId)
                    .col(Generation::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Generation::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Generation {
    #[sea_orm(iden = "generations")]
    Table,
    Id,
    ProjectId,
    UserId,
    Prompt,
    Response,
    GeneratedFiles,
    ModelUsed,
    Provider,
    Success,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Project {
    #[sea_orm(iden = "projects")]
    Table,
    Id,
}
