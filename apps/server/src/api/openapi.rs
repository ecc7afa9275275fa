//! OpenAPI documentation configuration.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "CodeGenesis Server",
        version = "0.4.0",
        description = "API server for the CodeGenesis AI app-builder dashboard: \
                       projects, generation history, provider keys, and the \
                       code-generation proxy"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Project endpoints
        api::projects::list_projects,
        api::projects::create_project,
        api::projects::get_project,
        api::projects::update_project,
        api::projects::delete_project,
        // Generation endpoints
        api::generations::record_generation,
        api::generate::generate,
        // Profile endpoints
        api::profile::get_profile,
        api::profile::upsert_profile,
        // Key endpoints
        api::keys::list_keys,
        api::keys::store_key,
        api::keys::delete_key,
        api::keys::get_preference,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Projects
            models::ProjectStatus,
            models::Project,
            models::ProjectDetail,
            models::CreateProjectRequest,
            models::UpdateProjectRequest,
            // Generations
            models::Generation,
            models::RecordGenerationRequest,
            models::GenerateRequest,
            models::GenerateResponse,
            // Profile
            models::Profile,
            models::UpsertProfileRequest,
            // Keys
            models::Provider,
            models::StoredKeySummary,
            models::SaveKeyRequest,
            models::SaveKeyResponse,
            models::ModelPreferenceResponse,
            api::keys::ProvidersResponse,
        )
    ),
    tags(
        (name = "Health", description = "Liveness and database connectivity"),
        (name = "Projects", description = "Project CRUD"),
        (name = "Generations", description = "Generation recording and the LLM proxy"),
        (name = "Generate", description = "Code generation"),
        (name = "Profile", description = "User profile"),
        (name = "Keys", description = "Encrypted provider API keys"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Registers the bearer-session security scheme referenced by the paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
