//! Database queries for generations.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::entity::generation::{self, ActiveModel, Column, Entity as Generation};
use crate::error::{AppError, AppResult};

use super::DbPool;

impl DbPool {
    /// Insert one immutable generation row.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert_generation(
        &self,
        id: Uuid,
        project_id: Uuid,
        user_id: &str,
        prompt: &str,
        response: Option<String>,
        generated_files: Option<JsonValue>,
        model_used: &str,
        provider: &str,
        success: bool,
    ) -> AppResult<generation::Model> {
        let model = ActiveModel {
            id: Set(id),
            project_id: Set(project_id),
            user_id: Set(user_id.to_string()),
            prompt: Set(prompt.to_string()),
            response: Set(response),
            generated_files: Set(generated_files),
            model_used: Set(model_used.to_string()),
            provider: Set(provider.to_string()),
            success: Set(success),
            created_at: Set(Utc::now()),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert generation: {}", e)))?;

        Ok(result)
    }

    /// List a project's generations, oldest first, for chat-history replay.
    pub async fn list_generations_for_project(
        &self,
        project_id: Uuid,
    ) -> AppResult<Vec<generation::Model>> {
        let generations = Generation::find()
            .filter(Column::ProjectId.eq(project_id))
            .order_by_asc(Column::CreatedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list generations: {}", e)))?;

        Ok(generations)
    }
}
