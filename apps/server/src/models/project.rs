//! Project models: a user-owned unit of generated application code plus
//! metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::generation::Generation;

/// Project lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Planning,
    InProgress,
    Completed,
    Deployed,
}

impl ProjectStatus {
    /// String form stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Deployed => "deployed",
        }
    }

    /// Parse from the stored string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "planning" => Some(Self::Planning),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "deployed" => Some(Self::Deployed),
            _ => None,
        }
    }
}

/// Project row as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Project {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub tech_stack: Vec<String>,
    pub status: String,
    /// Single-file content map: filename -> { content, language }.
    #[schema(value_type = Option<Object>)]
    pub files: Option<JsonValue>,
    pub github_url: Option<String>,
    pub deployed_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::project::Model> for Project {
    fn from(m: crate::entity::project::Model) -> Self {
        // tech_stack is stored as a JSON array of strings; anything else
        // collapses to empty rather than failing the whole response.
        let tech_stack = m
            .tech_stack
            .as_array()
            .map(|a| {
                a.iter()
                    .filter_map(|v| v.as_str().map(|s| s.to_string()))
                    .collect()
            })
            .unwrap_or_default();

        Project {
            id: m.id,
            user_id: m.user_id,
            name: m.name,
            description: m.description,
            tech_stack,
            status: m.status,
            files: m.files,
            github_url: m.github_url,
            deployed_url: m.deployed_url,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Project plus its replayed generation history (oldest first).
#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub generations: Vec<Generation>,
}

/// Request body for creating a project.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub tech_stack: Option<Vec<String>>,
    pub status: Option<ProjectStatus>,
}

/// Request body for updating a project. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub tech_stack: Option<Vec<String>>,
    pub status: Option<ProjectStatus>,
    #[schema(value_type = Option<Object>)]
    pub files: Option<JsonValue>,
    pub github_url: Option<String>,
    pub deployed_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for s in ["planning", "in_progress", "completed", "deployed"] {
            let parsed = ProjectStatus::parse(s).unwrap();
            assert_eq!(parsed.as_str(), s);
        }
        assert_eq!(ProjectStatus::parse("archived"), None);
    }

    #[test]
    fn test_tech_stack_tolerates_non_array() {
        let m = crate::entity::project::Model {
            id: Uuid::new_v4(),
            user_id: "user_1".into(),
            name: "demo".into(),
            description: None,
            tech_stack: serde_json::json!({"not": "an array"}),
            status: "planning".into(),
            files: None,
            github_url: None,
            deployed_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let p = Project::from(m);
        assert!(p.tech_stack.is_empty());
    }
}
