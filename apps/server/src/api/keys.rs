//! Provider API key endpoints.
//!
//! Key material flows through `SecretString` and is stored encrypted by
//! the secrets helper; responses never contain ciphertext or plaintext.

use actix_web::{web, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::SessionAuth;
use crate::config::Config;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{
    DeleteKeyQuery, ModelPreferenceResponse, PreferenceQuery, Provider, SaveKeyRequest,
    SaveKeyResponse, StoredKeySummary,
};
use crate::services::secret_keys;

/// Response for the provider list endpoint.
#[derive(Serialize, ToSchema)]
pub struct ProvidersResponse {
    pub providers: Vec<StoredKeySummary>,
}

/// List the caller's configured providers.
#[utoipa::path(
    get,
    path = "/api/v1/keys",
    tag = "Keys",
    responses(
        (status = 200, description = "Configured providers", body = ProvidersResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
    ),
    security(("session" = []))
)]
pub async fn list_keys(auth: SessionAuth, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let providers = secret_keys::list_configured(pool.get_ref(), &auth.user.user_id).await?;

    Ok(HttpResponse::Ok().json(ProvidersResponse { providers }))
}

/// Store a provider API key (encrypted at rest).
///
/// Also upserts the model preference when `model_id` is supplied.
#[utoipa::path(
    post,
    path = "/api/v1/keys",
    tag = "Keys",
    request_body = SaveKeyRequest,
    responses(
        (status = 200, description = "Key stored", body = SaveKeyResponse),
        (status = 400, description = "Missing field or unknown provider", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
    ),
    security(("session" = []))
)]
pub async fn store_key(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    body: web::Json<SaveKeyRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let (provider_str, api_key) = match (req.provider, req.api_key) {
        (Some(p), Some(k)) => (p, k),
        _ => {
            return Err(AppError::InvalidInput(
                "Provider and API key are required".to_string(),
            ))
        }
    };

    let provider = Provider::parse(&provider_str)
        .ok_or_else(|| AppError::InvalidInput("Invalid provider".to_string()))?;

    secret_keys::store_key(
        pool.get_ref(),
        &config.key_encryption_secret,
        &auth.user.user_id,
        provider,
        &api_key,
        req.key_name,
    )
    .await?;

    if let Some(model_id) = req.model_id {
        pool.upsert_model_preference(&auth.user.user_id, provider, &model_id, req.is_custom_model)
            .await?;
    }

    Ok(HttpResponse::Ok().json(SaveKeyResponse {
        success: true,
        message: "API key stored securely".to_string(),
        provider: provider.as_str().to_string(),
    }))
}

/// Delete the caller's key rows for a provider.
#[utoipa::path(
    delete,
    path = "/api/v1/keys",
    tag = "Keys",
    params(("provider" = String, Query, description = "Provider to delete")),
    responses(
        (status = 200, description = "Key deleted"),
        (status = 400, description = "Missing or unknown provider", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
    ),
    security(("session" = []))
)]
pub async fn delete_key(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    query: web::Query<DeleteKeyQuery>,
) -> AppResult<HttpResponse> {
    let provider_str = query
        .into_inner()
        .provider
        .ok_or_else(|| AppError::InvalidInput("Provider is required".to_string()))?;

    let provider = Provider::parse(&provider_str)
        .ok_or_else(|| AppError::InvalidInput("Invalid provider".to_string()))?;

    secret_keys::delete_keys(pool.get_ref(), &auth.user.user_id, provider).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "API key deleted"
    })))
}

/// Fetch the caller's model preference for a provider.
#[utoipa::path(
    get,
    path = "/api/v1/keys/preferences",
    tag = "Keys",
    params(("provider" = String, Query, description = "Provider to look up")),
    responses(
        (status = 200, description = "Stored preference", body = ModelPreferenceResponse),
        (status = 400, description = "Missing or unknown provider", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 404, description = "No preference stored", body = crate::error::ErrorResponse),
    ),
    security(("session" = []))
)]
pub async fn get_preference(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    query: web::Query<PreferenceQuery>,
) -> AppResult<HttpResponse> {
    let provider_str = query
        .into_inner()
        .provider
        .ok_or_else(|| AppError::InvalidInput("Provider is required".to_string()))?;

    let provider = Provider::parse(&provider_str)
        .ok_or_else(|| AppError::InvalidInput("Invalid provider".to_string()))?;

    let preference = pool
        .get_model_preference(&auth.user.user_id, provider)
        .await?
        .ok_or_else(|| AppError::NotFound("Model preference".to_string()))?;

    Ok(HttpResponse::Ok().json(ModelPreferenceResponse::from(preference)))
}

/// Configure key routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/keys")
            .route(web::get().to(list_keys))
            .route(web::post().to(store_key))
            .route(web::delete().to(delete_key)),
    )
    .service(web::resource("/keys/preferences").route(web::get().to(get_preference)));
}
