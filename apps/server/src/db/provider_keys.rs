//! Database queries for encrypted provider keys.
//!
//! Row lifecycle only; the encrypt/decrypt round trips live in
//! `services::secret_keys`, which delegates to pgcrypto.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::entity::provider_key::{self, ActiveModel, Column, Entity as ProviderKey};
use crate::error::{AppError, AppResult};
use crate::models::Provider;

use super::DbPool;

impl DbPool {
    /// Find the single active key row for a (user, provider) pair.
    pub async fn find_active_key(
        &self,
        user_id: &str,
        provider: Provider,
    ) -> AppResult<Option<provider_key::Model>> {
        let result = ProviderKey::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::Provider.eq(provider.as_str()))
            .filter(Column::IsActive.eq(true))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to find active key: {}", e)))?;

        Ok(result)
    }

    /// Deactivate any active key rows for a (user, provider) pair.
    /// Prior rows stay in the table; they are never deleted here.
    pub async fn deactivate_keys(&self, user_id: &str, provider: Provider) -> AppResult<u64> {
        let result = ProviderKey::update_many()
            .col_expr(Column::IsActive, Expr::value(false))
            .filter(Column::UserId.eq(user_id))
            .filter(Column::Provider.eq(provider.as_str()))
            .filter(Column::IsActive.eq(true))
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to deactivate keys: {}", e)))?;

        Ok(result.rows_affected)
    }

    /// Insert a new active ciphertext row.
    pub async fn insert_encrypted_key(
        &self,
        user_id: &str,
        provider: Provider,
        encrypted_key: Vec<u8>,
        key_name: Option<String>,
    ) -> AppResult<provider_key::Model> {
        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id.to_string()),
            provider: Set(provider.as_str().to_string()),
            encrypted_key: Set(encrypted_key),
            key_name: Set(key_name),
            is_active: Set(true),
            last_used_at: Set(None),
            created_at: Set(Utc::now()),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert key: {}", e)))?;

        Ok(result)
    }

    /// Update a key row's last-used timestamp.
    pub async fn touch_key(&self, id: Uuid) -> AppResult<()> {
        let model = ProviderKey::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to load key: {}", e)))?;

        if let Some(m) = model {
            let mut active: ActiveModel = m.into();
            active.last_used_at = Set(Some(Utc::now()));
            active
                .update(self.connection())
                .await
                .map_err(|e| AppError::Database(format!("Failed to touch key: {}", e)))?;
        }

        Ok(())
    }

    /// Delete all key rows for a (user, provider) pair.
    pub async fn delete_keys(&self, user_id: &str, provider: Provider) -> AppResult<u64> {
        let result = ProviderKey::delete_many()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::Provider.eq(provider.as_str()))
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete keys: {}", e)))?;

        Ok(result.rows_affected)
    }

    /// List a user's active key rows across providers.
    pub async fn list_active_keys(&self, user_id: &str) -> AppResult<Vec<provider_key::Model>> {
        let results = ProviderKey::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::IsActive.eq(true))
            .order_by_asc(Column::Provider)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list keys: {}", e)))?;

        Ok(results)
    }
}
