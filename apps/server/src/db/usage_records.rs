//! Database queries for usage tracking.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

use crate::entity::usage_record::ActiveModel;
use crate::error::{AppError, AppResult};

use super::DbPool;

impl DbPool {
    /// Record one LLM call. Callers treat failure as best-effort.
    pub async fn insert_usage_record(
        &self,
        user_id: &str,
        project_id: Option<Uuid>,
        provider: &str,
        model: &str,
        tokens_used: i64,
        cost_usd: f64,
    ) -> AppResult<()> {
        let record = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id.to_string()),
            project_id: Set(project_id),
            provider: Set(provider.to_string()),
            model: Set(model.to_string()),
            tokens_used: Set(tokens_used),
            cost_usd: Set(cost_usd),
            created_at: Set(Utc::now()),
        };

        record
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to record usage: {}", e)))?;

        Ok(())
    }
}
