//! Code-generation proxy handler.

use actix_web::{web, HttpRequest, HttpResponse};
use secrecy::SecretString;
use tracing::warn;

use crate::auth::SessionAuth;
use crate::config::Config;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{GenerateRequest, GenerateResponse, Provider};
use crate::services::llm::LlmDispatcher;
use crate::services::secret_keys;

/// Request header carrying a caller-supplied OpenAI key.
pub const OPENAI_KEY_HEADER: &str = "x-openai-key";
/// Request header carrying a caller-supplied Anthropic key.
pub const ANTHROPIC_KEY_HEADER: &str = "x-anthropic-key";

/// Extract a non-empty secret header value.
fn extract_key_header(req: &HttpRequest, header_name: &str) -> Option<SecretString> {
    req.headers()
        .get(header_name)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.trim().is_empty())
        .map(|s| SecretString::from(s.to_string()))
}

/// Generate application code from a prompt.
///
/// Provider keys arrive as request headers; when neither header is set,
/// the caller's stored active key is decrypted and used instead.
/// Anthropic wins over OpenAI when both are available.
#[utoipa::path(
    post,
    path = "/api/v1/generate",
    tag = "Generate",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Generated code", body = GenerateResponse),
        (status = 400, description = "No provider key available", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 500, description = "Provider failure", body = crate::error::ErrorResponse),
    ),
    security(("session" = []))
)]
pub async fn generate(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    dispatcher: web::Data<LlmDispatcher>,
    req: HttpRequest,
    body: web::Json<GenerateRequest>,
) -> AppResult<HttpResponse> {
    let payload = body.into_inner();

    if payload.prompt.trim().is_empty() {
        return Err(AppError::InvalidInput("Prompt is required".to_string()));
    }

    let (provider, api_key) =
        resolve_provider_key(&auth, pool.get_ref(), config.get_ref(), &req).await?;

    // Explicit model, then the stored preference, then the provider default
    let model = match payload.model {
        Some(m) if !m.trim().is_empty() => m,
        _ => match pool
            .get_model_preference(&auth.user.user_id, provider)
            .await?
        {
            Some(pref) => pref.model_id,
            None => provider.default_model().to_string(),
        },
    };

    let outcome = dispatcher
        .generate(
            provider,
            &api_key,
            &model,
            &payload.prompt,
            payload.code.as_deref(),
        )
        .await?;

    // Usage rows are best-effort; a failed insert never fails the turn
    if let Err(e) = pool
        .insert_usage_record(
            &auth.user.user_id,
            None,
            provider.as_str(),
            &outcome.model,
            outcome.tokens_used.unwrap_or(0),
            0.0,
        )
        .await
    {
        warn!("Failed to record usage: {}", e);
    }

    Ok(HttpResponse::Ok().json(GenerateResponse {
        code: outcome.code,
        model: outcome.model,
        provider: provider.as_str().to_string(),
    }))
}

/// Pick the provider and key for this request: header keys first
/// (Anthropic preferred), then the caller's stored active keys.
async fn resolve_provider_key(
    auth: &SessionAuth,
    pool: &DbPool,
    config: &Config,
    req: &HttpRequest,
) -> AppResult<(Provider, SecretString)> {
    if let Some(key) = extract_key_header(req, ANTHROPIC_KEY_HEADER) {
        return Ok((Provider::Anthropic, key));
    }
    if let Some(key) = extract_key_header(req, OPENAI_KEY_HEADER) {
        return Ok((Provider::OpenAi, key));
    }

    for provider in [Provider::Anthropic, Provider::OpenAi] {
        if let Some(key) = secret_keys::retrieve_key(
            pool,
            &config.key_encryption_secret,
            &auth.user.user_id,
            provider,
        )
        .await?
        {
            return Ok((provider, key));
        }
    }

    Err(AppError::InvalidInput(
        "No provider API key available. Supply one in the request headers \
         or store one in Settings."
            .to_string(),
    ))
}

/// Configure generate routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/generate").route(web::post().to(generate)));
}
