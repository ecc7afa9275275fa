//! Typed data-access helpers over the CodeGenesis server's HTTP API.
//!
//! Session token and provider keys are explicit constructor/call inputs;
//! nothing is read from ambient storage.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Provider keys forwarded with generation requests.
///
/// Read once at startup (flags or environment) and passed explicitly to
/// the calls that need them.
#[derive(Debug, Clone, Default)]
pub struct ProviderKeys {
    pub openai: Option<String>,
    pub anthropic: Option<String>,
}

impl ProviderKeys {
    /// True when no generation-capable key is present.
    pub fn is_empty(&self) -> bool {
        self.openai.is_none() && self.anthropic.is_none()
    }
}

/// Client errors.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Api { status: u16, message: String },
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Error body returned by the server.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    error: String,
}

/// Project row.
#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    pub status: String,
    #[serde(default)]
    pub files: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One recorded generation turn.
#[derive(Debug, Clone, Deserialize)]
pub struct Generation {
    pub id: Uuid,
    pub prompt: String,
    pub response: Option<String>,
    pub model_used: String,
    pub provider: String,
    pub success: bool,
    pub created_at: DateTime<Utc>,
}

/// Project plus its generation history, oldest first.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    #[serde(default)]
    pub generations: Vec<Generation>,
}

/// Result of a generate call.
#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    pub code: String,
    pub model: String,
    pub provider: String,
}

/// One configured provider credential summary.
#[derive(Debug, Deserialize)]
pub struct StoredKeySummary {
    pub provider: String,
    pub key_name: Option<String>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ProvidersResponse {
    pub providers: Vec<StoredKeySummary>,
}

/// User profile row.
#[derive(Debug, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub subscription_tier: String,
}

#[derive(Serialize)]
struct CreateProjectBody<'a> {
    name: &'a str,
    description: Option<&'a str>,
    tech_stack: &'a [String],
}

#[derive(Serialize)]
struct RecordGenerationBody<'a> {
    prompt: &'a str,
    response: &'a str,
    code: &'a str,
    model: &'a str,
    provider: &'a str,
}

#[derive(Serialize)]
struct GenerateBody<'a> {
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a str>,
}

#[derive(Serialize)]
struct SaveKeyBody<'a> {
    provider: &'a str,
    api_key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    key_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_id: Option<&'a str>,
}

#[derive(Serialize)]
struct UpdateFilesBody<'a> {
    files: &'a JsonValue,
}

/// Typed wrapper over the server's HTTP API.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session_token: String,
}

impl ApiClient {
    /// Build a client for the given server with an explicit session token.
    pub fn new(base_url: &str, session_token: &str) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(180))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session_token: session_token.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    async fn handle<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> ClientResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let message = match response.json::<ApiErrorBody>().await {
            Ok(body) if !body.message.is_empty() => body.message,
            Ok(body) => body.error,
            Err(_) => status.to_string(),
        };

        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// List the caller's projects.
    pub async fn list_projects(&self) -> ClientResult<Vec<Project>> {
        let response = self
            .http
            .get(self.url("/projects"))
            .bearer_auth(&self.session_token)
            .send()
            .await?;
        Self::handle(response).await
    }

    /// Create a project.
    pub async fn create_project(
        &self,
        name: &str,
        description: Option<&str>,
        tech_stack: &[String],
    ) -> ClientResult<Project> {
        let response = self
            .http
            .post(self.url("/projects"))
            .bearer_auth(&self.session_token)
            .json(&CreateProjectBody {
                name,
                description,
                tech_stack,
            })
            .send()
            .await?;
        Self::handle(response).await
    }

    /// Fetch a project with its generation history.
    pub async fn get_project(&self, id: Uuid) -> ClientResult<ProjectDetail> {
        let response = self
            .http
            .get(self.url(&format!("/projects/{}", id)))
            .bearer_auth(&self.session_token)
            .send()
            .await?;
        Self::handle(response).await
    }

    /// Delete a project.
    pub async fn delete_project(&self, id: Uuid) -> ClientResult<()> {
        let response = self
            .http
            .delete(self.url(&format!("/projects/{}", id)))
            .bearer_auth(&self.session_token)
            .send()
            .await?;
        Self::handle::<JsonValue>(response).await?;
        Ok(())
    }

    /// Persist a project's file map (used by auto-save).
    pub async fn update_project_files(&self, id: Uuid, files: &JsonValue) -> ClientResult<()> {
        let response = self
            .http
            .put(self.url(&format!("/projects/{}", id)))
            .bearer_auth(&self.session_token)
            .json(&UpdateFilesBody { files })
            .send()
            .await?;
        Self::handle::<JsonValue>(response).await?;
        Ok(())
    }

    /// Record a generation turn against a project (best-effort from the
    /// editor's perspective).
    pub async fn record_generation(
        &self,
        project_id: Uuid,
        prompt: &str,
        response_text: &str,
        code: &str,
        model: &str,
        provider: &str,
    ) -> ClientResult<()> {
        let response = self
            .http
            .post(self.url(&format!("/projects/{}/generations", project_id)))
            .bearer_auth(&self.session_token)
            .json(&RecordGenerationBody {
                prompt,
                response: response_text,
                code,
                model,
                provider,
            })
            .send()
            .await?;
        Self::handle::<JsonValue>(response).await?;
        Ok(())
    }

    /// Generate code from a prompt, forwarding provider keys as headers.
    pub async fn generate(
        &self,
        prompt: &str,
        code: Option<&str>,
        keys: &ProviderKeys,
    ) -> ClientResult<GenerateResponse> {
        let mut request = self
            .http
            .post(self.url("/generate"))
            .bearer_auth(&self.session_token)
            .json(&GenerateBody {
                prompt,
                model: None,
                code,
            });

        if let Some(ref key) = keys.openai {
            request = request.header("x-openai-key", key);
        }
        if let Some(ref key) = keys.anthropic {
            request = request.header("x-anthropic-key", key);
        }

        let response = request.send().await?;
        Self::handle(response).await
    }

    /// List configured providers.
    pub async fn list_keys(&self) -> ClientResult<ProvidersResponse> {
        let response = self
            .http
            .get(self.url("/keys"))
            .bearer_auth(&self.session_token)
            .send()
            .await?;
        Self::handle(response).await
    }

    /// Store a provider key server-side (encrypted at rest).
    pub async fn store_key(
        &self,
        provider: &str,
        api_key: &str,
        key_name: Option<&str>,
        model_id: Option<&str>,
    ) -> ClientResult<()> {
        let response = self
            .http
            .post(self.url("/keys"))
            .bearer_auth(&self.session_token)
            .json(&SaveKeyBody {
                provider,
                api_key,
                key_name,
                model_id,
            })
            .send()
            .await?;
        Self::handle::<JsonValue>(response).await?;
        Ok(())
    }

    /// Delete a provider's stored keys.
    pub async fn delete_key(&self, provider: &str) -> ClientResult<()> {
        let response = self
            .http
            .delete(format!("{}?provider={}", self.url("/keys"), provider))
            .bearer_auth(&self.session_token)
            .send()
            .await?;
        Self::handle::<JsonValue>(response).await?;
        Ok(())
    }

    /// Fetch the caller's profile.
    pub async fn get_profile(&self) -> ClientResult<Profile> {
        let response = self
            .http
            .get(self.url("/profile"))
            .bearer_auth(&self.session_token)
            .send()
            .await?;
        Self::handle(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_normalized() {
        let client = ApiClient::new("http://localhost:8080/", "tok").unwrap();
        assert_eq!(client.url("/projects"), "http://localhost:8080/api/v1/projects");
    }

    #[test]
    fn test_provider_keys_empty() {
        assert!(ProviderKeys::default().is_empty());
        assert!(!ProviderKeys {
            openai: Some("sk-x".into()),
            anthropic: None,
        }
        .is_empty());
    }
}
