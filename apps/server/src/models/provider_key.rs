//! Provider API key models.
//!
//! Plaintext key material is wrapped in `SecretString` the moment it is
//! deserialized and never appears in responses or logs.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// External LLM vendors a user may supply credentials for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Anthropic,
    OpenRouter,
    Groq,
    Stability,
}

impl Provider {
    /// String form stored in the database and used in JSON bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::OpenRouter => "openrouter",
            Self::Groq => "groq",
            Self::Stability => "stability",
        }
    }

    /// Parse from the stored string form. Returns None outside the allow-list.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "openai" => Some(Self::OpenAi),
            "anthropic" => Some(Self::Anthropic),
            "openrouter" => Some(Self::OpenRouter),
            "groq" => Some(Self::Groq),
            "stability" => Some(Self::Stability),
            _ => None,
        }
    }

    /// Default model used when the caller names none.
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o",
            Self::Anthropic => "claude-3-5-sonnet",
            Self::OpenRouter => "anthropic/claude-3.5-sonnet",
            Self::Groq => "llama-3.3-70b-versatile",
            Self::Stability => "stable-diffusion-3",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One configured provider credential, without any key material.
#[derive(Debug, Serialize, ToSchema)]
pub struct StoredKeySummary {
    pub provider: String,
    pub key_name: Option<String>,
    pub is_active: bool,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::provider_key::Model> for StoredKeySummary {
    fn from(m: crate::entity::provider_key::Model) -> Self {
        StoredKeySummary {
            provider: m.provider,
            key_name: m.key_name,
            is_active: m.is_active,
            last_used_at: m.last_used_at,
            created_at: m.created_at,
        }
    }
}

/// Request body for storing a provider API key.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SaveKeyRequest {
    pub provider: Option<String>,
    #[schema(value_type = String)]
    pub api_key: Option<SecretString>,
    pub key_name: Option<String>,
    pub model_id: Option<String>,
    #[serde(default)]
    pub is_custom_model: bool,
}

/// Response body after storing a key.
#[derive(Debug, Serialize, ToSchema)]
pub struct SaveKeyResponse {
    pub success: bool,
    pub message: String,
    pub provider: String,
}

/// Query string for deleting a key.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteKeyQuery {
    pub provider: Option<String>,
}

/// Query string for reading a model preference.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PreferenceQuery {
    pub provider: Option<String>,
}

/// Stored model preference for a (user, provider) pair.
#[derive(Debug, Serialize, ToSchema)]
pub struct ModelPreferenceResponse {
    pub provider: String,
    pub model_id: String,
    pub is_custom: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::model_preference::Model> for ModelPreferenceResponse {
    fn from(m: crate::entity::model_preference::Model) -> Self {
        ModelPreferenceResponse {
            provider: m.provider,
            model_id: m.model_id,
            is_custom: m.is_custom,
            updated_at: m.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_round_trip() {
        for s in ["openai", "anthropic", "openrouter", "groq", "stability"] {
            let parsed = Provider::parse(s).unwrap();
            assert_eq!(parsed.as_str(), s);
        }
    }

    #[test]
    fn test_provider_rejects_unknown() {
        assert_eq!(Provider::parse("cohere"), None);
        assert_eq!(Provider::parse(""), None);
        assert_eq!(Provider::parse("OpenAI"), None);
    }
}
