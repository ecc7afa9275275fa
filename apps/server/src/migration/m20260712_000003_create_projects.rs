//! Create projects table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Project::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Project::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Project::UserId).string().not_null())
                    .col(ColumnDef::new(Project::Name).string().not_null())
                    .col(ColumnDef::new(Project::Description).string())
                    .col(
                        ColumnDef::new(Project::TechStack)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(Project::Status)
                            .string()
                            .not_null()
                            .default("planning"),
                    )
                    .col(ColumnDef::new(Project::Files).json_binary())
                    .col(ColumnDef::new(Project::GithubUrl).string())
                    .col(ColumnDef::new(Project::DeployedUrl).string())
                    .col(
                        ColumnDef::new(Project::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Project::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // list + sweep both filter by owner, sweep additionally by age
        manager
            .create_index(
                Index::create()
                    .name("idx_projects_user_id")
                    .table(Project::Table)
                    .col(Project::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_projects_user_created")
                    .table(Project::Table)
                    .col(Project::UserId)
                    .col(Project::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Project::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Project {
    #[sea_orm(iden = "projects")]
    Table,
    Id,
    UserId,
    Name,
    Description,
    TechStack,
    Status,
    Files,
    GithubUrl,
    DeployedUrl,
    CreatedAt,
    UpdatedAt,
}
