//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20260712_000001_enable_pgcrypto;
mod m20260712_000002_create_profiles;
mod m20260712_000003_create_projects;
mod m20260712_000004_create_generations;
mod m20260712_000005_create_provider_keys;
mod m20260712_000006_create_model_preferences;
mod m20260712_000007_create_usage_records;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260712_000001_enable_pgcrypto::Migration),
            Box::new(m20260712_000002_create_profiles::Migration),
            Box::new(m20260712_000003_create_projects::Migration),
            Box::new(m20260712_000004_create_generations::Migration),
            Box::new(m20260712_000005_create_provider_keys::Migration),
            Box::new(m20260712_000006_create_model_preferences::Migration),
            Box::new(m20260712_000007_create_usage_records::Migration),
        ]
    }
}
