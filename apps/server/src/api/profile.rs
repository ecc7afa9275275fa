//! Profile API handlers.

use actix_web::{web, HttpResponse};

use crate::auth::SessionAuth;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{Profile, UpsertProfileRequest};

/// Fetch the caller's profile.
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    tag = "Profile",
    responses(
        (status = 200, description = "The caller's profile", body = Profile),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 404, description = "No profile yet", body = crate::error::ErrorResponse),
    ),
    security(("session" = []))
)]
pub async fn get_profile(auth: SessionAuth, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let profile = pool
        .get_profile(&auth.user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile".to_string()))?;

    Ok(HttpResponse::Ok().json(Profile::from(profile)))
}

/// Create or update the caller's profile.
///
/// The row id always comes from the session; a caller cannot write
/// another user's profile.
#[utoipa::path(
    post,
    path = "/api/v1/profile",
    tag = "Profile",
    request_body = UpsertProfileRequest,
    responses(
        (status = 200, description = "Upserted profile", body = Profile),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
    ),
    security(("session" = []))
)]
pub async fn upsert_profile(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    body: web::Json<UpsertProfileRequest>,
) -> AppResult<HttpResponse> {
    let profile = pool.upsert_profile(&auth.user, body.into_inner()).await?;

    Ok(HttpResponse::Ok().json(Profile::from(profile)))
}

/// Configure profile routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/profile")
            .route(web::get().to(get_profile))
            .route(web::post().to(upsert_profile)),
    );
}
