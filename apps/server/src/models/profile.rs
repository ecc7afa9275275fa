//! Profile models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Profile row as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Profile {
    pub id: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub subscription_tier: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::profile::Model> for Profile {
    fn from(m: crate::entity::profile::Model) -> Self {
        Profile {
            id: m.id,
            email: m.email,
            full_name: m.full_name,
            avatar_url: m.avatar_url,
            subscription_tier: m.subscription_tier,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Request body for creating/updating the caller's profile.
///
/// The id always comes from the session, never from the body.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpsertProfileRequest {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub subscription_tier: Option<String>,
}
