//! Project entity for SeaORM.

use sea_orm::entity::prelude::*;
use serde_json::Value as JsonValue;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    /// Technology-stack tags, stored as a JSON array of strings.
    #[sea_orm(column_type = "JsonBinary")]
    pub tech_stack: JsonValue,
    pub status: String,
    /// Single-file content map: filename -> { content, language }.
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub files: Option<JsonValue>,
    pub github_url: Option<String>,
    pub deployed_url: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::generation::Entity")]
    Generations,
}

impl Related<super::generation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Generations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
