//! Generation recording handlers.

use actix_web::{web, HttpResponse};
use tracing::warn;
use uuid::Uuid;

use crate::auth::SessionAuth;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::generation::single_file_map;
use crate::models::{Generation, RecordGenerationRequest};

use super::projects::load_owned_project;

/// Record one chat turn against a project.
///
/// Inserts an immutable Generation row and overwrites the project's file
/// map with the new code (last writer wins, no merge).
#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/generations",
    tag = "Generations",
    params(("id" = Uuid, Path, description = "Project id")),
    request_body = RecordGenerationRequest,
    responses(
        (status = 200, description = "Recorded generation", body = Generation),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 403, description = "Owned by another user", body = crate::error::ErrorResponse),
        (status = 404, description = "No such project", body = crate::error::ErrorResponse),
    ),
    security(("session" = []))
)]
pub async fn record_generation(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<RecordGenerationRequest>,
) -> AppResult<HttpResponse> {
    let project_id = path.into_inner();
    let req = body.into_inner();

    load_owned_project(pool.get_ref(), &auth, project_id).await?;

    let files = single_file_map(&req.code);
    let model = req.model.as_deref().unwrap_or("gpt-4o");
    let provider = req.provider.as_deref().unwrap_or("openai");

    let generation = pool
        .insert_generation(
            Uuid::new_v4(),
            project_id,
            &auth.user.user_id,
            &req.prompt,
            req.response,
            Some(files.clone()),
            model,
            provider,
            true,
        )
        .await?;

    pool.overwrite_project_files(project_id, files).await?;

    // Usage rows are best-effort; a failed insert never fails the turn
    if let Err(e) = pool
        .insert_usage_record(
            &auth.user.user_id,
            Some(project_id),
            provider,
            model,
            0,
            0.0,
        )
        .await
    {
        warn!("Failed to record usage for generation: {}", e);
    }

    Ok(HttpResponse::Ok().json(Generation::from(generation)))
}

/// Configure generation routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/projects/{id}/generations").route(web::post().to(record_generation)),
    );
}
