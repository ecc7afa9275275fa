//! Database queries for profiles.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

use crate::entity::profile::{self, ActiveModel, Entity as Profile};
use crate::error::{AppError, AppResult};
use crate::models::{AuthenticatedUser, UpsertProfileRequest};

use super::DbPool;

impl DbPool {
    /// Get a profile by user id.
    pub async fn get_profile(&self, user_id: &str) -> AppResult<Option<profile::Model>> {
        let result = Profile::find_by_id(user_id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get profile: {}", e)))?;

        Ok(result)
    }

    /// Create the caller's profile from session claims if it does not
    /// exist yet. Called as a side effect of project creation.
    pub async fn ensure_profile(&self, user: &AuthenticatedUser) -> AppResult<profile::Model> {
        if let Some(existing) = self.get_profile(&user.user_id).await? {
            return Ok(existing);
        }

        let now = Utc::now();
        let model = ActiveModel {
            id: Set(user.user_id.clone()),
            email: Set(user.email.clone()),
            full_name: Set(user.name.clone()),
            avatar_url: Set(user.avatar_url.clone()),
            subscription_tier: Set("free".to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to create profile: {}", e)))?;

        Ok(result)
    }

    /// Upsert the caller's profile. The id is always the session's user id.
    pub async fn upsert_profile(
        &self,
        user: &AuthenticatedUser,
        updates: UpsertProfileRequest,
    ) -> AppResult<profile::Model> {
        match self.get_profile(&user.user_id).await? {
            Some(existing) => {
                let mut active: ActiveModel = existing.into();
                if let Some(email) = updates.email {
                    active.email = Set(Some(email));
                }
                if let Some(full_name) = updates.full_name {
                    active.full_name = Set(Some(full_name));
                }
                if let Some(avatar_url) = updates.avatar_url {
                    active.avatar_url = Set(Some(avatar_url));
                }
                if let Some(tier) = updates.subscription_tier {
                    active.subscription_tier = Set(tier);
                }
                active.updated_at = Set(Utc::now());

                let result = active
                    .update(self.connection())
                    .await
                    .map_err(|e| AppError::Database(format!("Failed to update profile: {}", e)))?;

                Ok(result)
            }
            None => {
                let now = Utc::now();
                let model = ActiveModel {
                    id: Set(user.user_id.clone()),
                    email: Set(updates.email.or_else(|| user.email.clone())),
                    full_name: Set(updates.full_name.or_else(|| user.name.clone())),
                    avatar_url: Set(updates.avatar_url.or_else(|| user.avatar_url.clone())),
                    subscription_tier: Set(updates
                        .subscription_tier
                        .unwrap_or_else(|| "free".to_string())),
                    created_at: Set(now),
                    updated_at: Set(now),
                };

                let result = model
                    .insert(self.connection())
                    .await
                    .map_err(|e| AppError::Database(format!("Failed to create profile: {}", e)))?;

                Ok(result)
            }
        }
    }
}
