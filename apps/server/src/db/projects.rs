//! Database queries for projects.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::entity::project::{self, ActiveModel, Column, Entity as Project};
use crate::error::{AppError, AppResult};
use crate::models::{ProjectStatus, UpdateProjectRequest};

use super::DbPool;

impl DbPool {
    /// Count the projects a user owns.
    pub async fn count_projects_for_user(&self, user_id: &str) -> AppResult<u64> {
        let count = Project::find()
            .filter(Column::UserId.eq(user_id))
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count projects: {}", e)))?;

        Ok(count)
    }

    /// List a user's projects, newest first.
    pub async fn list_projects_for_user(&self, user_id: &str) -> AppResult<Vec<project::Model>> {
        let projects = Project::find()
            .filter(Column::UserId.eq(user_id))
            .order_by_desc(Column::CreatedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list projects: {}", e)))?;

        Ok(projects)
    }

    /// Insert a new project.
    pub async fn insert_project(
        &self,
        id: Uuid,
        user_id: &str,
        name: &str,
        description: Option<String>,
        tech_stack: Vec<String>,
        status: ProjectStatus,
    ) -> AppResult<project::Model> {
        let now = Utc::now();

        let model = ActiveModel {
            id: Set(id),
            user_id: Set(user_id.to_string()),
            name: Set(name.to_string()),
            description: Set(description),
            tech_stack: Set(JsonValue::from(tech_stack)),
            status: Set(status.as_str().to_string()),
            files: Set(None),
            github_url: Set(None),
            deployed_url: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert project: {}", e)))?;

        Ok(result)
    }

    /// Get a project by ID.
    pub async fn get_project_by_id(&self, id: Uuid) -> AppResult<Option<project::Model>> {
        let result = Project::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get project: {}", e)))?;

        Ok(result)
    }

    /// Apply a partial update to a project. Absent fields are untouched.
    pub async fn update_project(
        &self,
        existing: project::Model,
        updates: UpdateProjectRequest,
    ) -> AppResult<project::Model> {
        let mut active: ActiveModel = existing.into();

        if let Some(name) = updates.name {
            active.name = Set(name);
        }
        if let Some(description) = updates.description {
            active.description = Set(Some(description));
        }
        if let Some(tech_stack) = updates.tech_stack {
            active.tech_stack = Set(JsonValue::from(tech_stack));
        }
        if let Some(status) = updates.status {
            active.status = Set(status.as_str().to_string());
        }
        if let Some(files) = updates.files {
            active.files = Set(Some(files));
        }
        if let Some(github_url) = updates.github_url {
            active.github_url = Set(Some(github_url));
        }
        if let Some(deployed_url) = updates.deployed_url {
            active.deployed_url = Set(Some(deployed_url));
        }
        active.updated_at = Set(Utc::now());

        let result = active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update project: {}", e)))?;

        Ok(result)
    }

    /// Overwrite a project's file map with the latest generated code.
    /// Last writer wins; there is no merge.
    pub async fn overwrite_project_files(&self, id: Uuid, files: JsonValue) -> AppResult<()> {
        let existing = self
            .get_project_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Project".to_string()))?;

        let mut active: ActiveModel = existing.into();
        active.files = Set(Some(files));
        active.updated_at = Set(Utc::now());

        active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update project files: {}", e)))?;

        Ok(())
    }

    /// Delete a project. Generations cascade via the foreign key.
    pub async fn delete_project(&self, id: Uuid) -> AppResult<()> {
        Project::delete_by_id(id)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete project: {}", e)))?;

        Ok(())
    }

    /// Delete a user's projects created before the cutoff. Returns the
    /// number of rows removed. Scoped strictly to the given user.
    pub async fn delete_projects_older_than(
        &self,
        user_id: &str,
        cutoff: DateTime<Utc>,
    ) -> AppResult<u64> {
        let result = Project::delete_many()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::CreatedAt.lt(cutoff))
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to sweep old projects: {}", e)))?;

        Ok(result.rows_affected)
    }
}
