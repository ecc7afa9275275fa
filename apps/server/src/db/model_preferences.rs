//! Database queries for model preferences.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::entity::model_preference::{self, ActiveModel, Column, Entity as ModelPreference};
use crate::error::{AppError, AppResult};
use crate::models::Provider;

use super::DbPool;

impl DbPool {
    /// Get the stored preference for a (user, provider) pair.
    pub async fn get_model_preference(
        &self,
        user_id: &str,
        provider: Provider,
    ) -> AppResult<Option<model_preference::Model>> {
        let result = ModelPreference::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::Provider.eq(provider.as_str()))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get model preference: {}", e)))?;

        Ok(result)
    }

    /// Upsert the preference for a (user, provider) pair.
    pub async fn upsert_model_preference(
        &self,
        user_id: &str,
        provider: Provider,
        model_id: &str,
        is_custom: bool,
    ) -> AppResult<model_preference::Model> {
        match self.get_model_preference(user_id, provider).await? {
            Some(existing) => {
                let mut active: ActiveModel = existing.into();
                active.model_id = Set(model_id.to_string());
                active.is_custom = Set(is_custom);
                active.updated_at = Set(Utc::now());

                let result = active.update(self.connection()).await.map_err(|e| {
                    AppError::Database(format!("Failed to update model preference: {}", e))
                })?;

                Ok(result)
            }
            None => {
                let model = ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(user_id.to_string()),
                    provider: Set(provider.as_str().to_string()),
                    model_id: Set(model_id.to_string()),
                    is_custom: Set(is_custom),
                    updated_at: Set(Utc::now()),
                };

                let result = model.insert(self.connection()).await.map_err(|e| {
                    AppError::Database(format!("Failed to insert model preference: {}", e))
                })?;

                Ok(result)
            }
        }
    }
}
