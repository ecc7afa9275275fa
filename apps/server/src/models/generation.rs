//! Generation models: one recorded prompt/response/code turn, plus the
//! request/response bodies of the code-generation proxy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;
use uuid::Uuid;

/// Generation row as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Generation {
    pub id: Uuid,
    pub project_id: Uuid,
    pub user_id: String,
    pub prompt: String,
    pub response: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub generated_files: Option<JsonValue>,
    pub model_used: String,
    pub provider: String,
    pub success: bool,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::generation::Model> for Generation {
    fn from(m: crate::entity::generation::Model) -> Self {
        Generation {
            id: m.id,
            project_id: m.project_id,
            user_id: m.user_id,
            prompt: m.prompt,
            response: m.response,
            generated_files: m.generated_files,
            model_used: m.model_used,
            provider: m.provider,
            success: m.success,
            created_at: m.created_at,
        }
    }
}

/// Request body for recording a generation against a project.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RecordGenerationRequest {
    pub prompt: String,
    pub response: Option<String>,
    /// The full generated code; becomes the project's new file content.
    pub code: String,
    pub model: Option<String>,
    pub provider: Option<String>,
}

/// Request body for the code-generation proxy.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateRequest {
    pub prompt: String,
    /// Model identifier; defaults per provider when absent.
    pub model: Option<String>,
    /// Current code, sent to the model as context.
    pub code: Option<String>,
}

/// Response body of the code-generation proxy.
#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateResponse {
    pub code: String,
    pub model: String,
    pub provider: String,
}

/// Build the single-file content map stored on projects and generations.
pub fn single_file_map(code: &str) -> JsonValue {
    serde_json::json!({
        "index.html": {
            "content": code,
            "language": "html",
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_file_map_shape() {
        let map = single_file_map("<html></html>");
        assert_eq!(map["index.html"]["content"], "<html></html>");
        assert_eq!(map["index.html"]["language"], "html");
    }
}
