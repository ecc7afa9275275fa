//! Project API handlers.
//!
//! All authorization is "caller identity equals stored owner identity";
//! there is no role or sharing model.

use actix_web::{web, HttpResponse};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::SessionAuth;
use crate::config::Config;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateProjectRequest, Generation, Project, ProjectDetail, ProjectStatus, UpdateProjectRequest,
};
use crate::services::retention;

/// List the caller's projects.
///
/// Sweeps the caller's rows older than the retention window first; the
/// sweep stays coupled to this read and its failure never blocks the list.
#[utoipa::path(
    get,
    path = "/api/v1/projects",
    tag = "Projects",
    responses(
        (status = 200, description = "The caller's projects, newest first", body = [Project]),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
    ),
    security(("session" = []))
)]
pub async fn list_projects(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
) -> AppResult<HttpResponse> {
    if let Err(e) = retention::sweep_expired_projects(
        pool.get_ref(),
        &auth.user.user_id,
        config.project_retention_days,
    )
    .await
    {
        warn!("Retention sweep failed, continuing with list: {}", e);
    }

    let projects = pool.list_projects_for_user(&auth.user.user_id).await?;

    let response: Vec<Project> = projects.into_iter().map(Project::from).collect();
    Ok(HttpResponse::Ok().json(response))
}

/// Create a project.
///
/// Rejects once the caller owns the configured cap; lazily creates the
/// caller's profile from session claims when absent.
#[utoipa::path(
    post,
    path = "/api/v1/projects",
    tag = "Projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 200, description = "Project created", body = Project),
        (status = 400, description = "Missing name", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 403, description = "Project limit reached", body = crate::error::ErrorResponse),
    ),
    security(("session" = []))
)]
pub async fn create_project(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    body: web::Json<CreateProjectRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let name = match req.name.as_deref().map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => return Err(AppError::InvalidInput("Name is required".to_string())),
    };

    let owned = pool.count_projects_for_user(&auth.user.user_id).await?;
    ensure_within_project_cap(owned, config.max_projects_per_user)?;

    // Project rows reference the profile by user id; create it on first use
    pool.ensure_profile(&auth.user).await?;

    let project = pool
        .insert_project(
            Uuid::new_v4(),
            &auth.user.user_id,
            &name,
            req.description,
            req.tech_stack.unwrap_or_default(),
            req.status.unwrap_or(ProjectStatus::Planning),
        )
        .await?;

    info!(
        "Project {} created for user {}",
        project.id, auth.user.user_id
    );

    Ok(HttpResponse::Ok().json(Project::from(project)))
}

/// Fetch a project with its generation history.
#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}",
    tag = "Projects",
    params(("id" = Uuid, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project with generations oldest-first", body = ProjectDetail),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 403, description = "Owned by another user", body = crate::error::ErrorResponse),
        (status = 404, description = "No such project", body = crate::error::ErrorResponse),
    ),
    security(("session" = []))
)]
pub async fn get_project(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let project = load_owned_project(pool.get_ref(), &auth, id).await?;

    let generations = pool
        .list_generations_for_project(id)
        .await?
        .into_iter()
        .map(Generation::from)
        .collect();

    Ok(HttpResponse::Ok().json(ProjectDetail {
        project: Project::from(project),
        generations,
    }))
}

/// Update a project. Absent fields are left untouched.
#[utoipa::path(
    put,
    path = "/api/v1/projects/{id}",
    tag = "Projects",
    params(("id" = Uuid, Path, description = "Project id")),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Updated project", body = Project),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 403, description = "Owned by another user", body = crate::error::ErrorResponse),
        (status = 404, description = "No such project", body = crate::error::ErrorResponse),
    ),
    security(("session" = []))
)]
pub async fn update_project(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateProjectRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let existing = load_owned_project(pool.get_ref(), &auth, id).await?;

    let updated = pool.update_project(existing, body.into_inner()).await?;

    Ok(HttpResponse::Ok().json(Project::from(updated)))
}

/// Delete a project and (via cascade) its generations.
#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}",
    tag = "Projects",
    params(("id" = Uuid, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project deleted"),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 403, description = "Owned by another user", body = crate::error::ErrorResponse),
        (status = 404, description = "No such project", body = crate::error::ErrorResponse),
    ),
    security(("session" = []))
)]
pub async fn delete_project(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    load_owned_project(pool.get_ref(), &auth, id).await?;

    pool.delete_project(id).await?;

    info!("Project {} deleted by user {}", id, auth.user.user_id);

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

/// Fetch a project and enforce the ownership check: 404 when absent,
/// 403 when owned by another user.
pub(crate) async fn load_owned_project(
    pool: &DbPool,
    auth: &SessionAuth,
    id: Uuid,
) -> AppResult<crate::entity::project::Model> {
    let project = pool
        .get_project_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project".to_string()))?;

    if !auth.user.owns(&project.user_id) {
        return Err(AppError::Forbidden(
            "You do not have access to this project".to_string(),
        ));
    }

    Ok(project)
}

/// Reject creation once the caller owns the cap.
fn ensure_within_project_cap(owned: u64, cap: u32) -> AppResult<()> {
    if owned >= cap as u64 {
        return Err(AppError::Forbidden(format!(
            "Project limit reached. You can only have a maximum of {} projects. \
             Please delete an existing project to create a new one.",
            cap
        )));
    }
    Ok(())
}

/// Configure project routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/projects")
            .route(web::get().to(list_projects))
            .route(web::post().to(create_project)),
    )
    .service(
        web::resource("/projects/{id}")
            .route(web::get().to(get_project))
            .route(web::put().to(update_project))
            .route(web::delete().to(delete_project)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cap_rejects_at_limit_with_forbidden() {
        let err = ensure_within_project_cap(5, 5).unwrap_err();
        match err {
            AppError::Forbidden(msg) => assert!(msg.contains("Project limit reached")),
            other => panic!("expected Forbidden, got {:?}", other),
        }
    }

    #[test]
    fn test_cap_allows_below_limit() {
        assert!(ensure_within_project_cap(4, 5).is_ok());
        assert!(ensure_within_project_cap(0, 5).is_ok());
    }

    #[test]
    fn test_cap_rejects_above_limit() {
        assert!(ensure_within_project_cap(6, 5).is_err());
    }
}
