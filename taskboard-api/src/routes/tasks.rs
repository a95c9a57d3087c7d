/// Task CRUD endpoints
///
/// All endpoints here sit behind the JWT middleware layer and extract the
/// caller's `AuthContext` from request extensions. Single-task reads and
/// writes run the role-or-ownership policy after the existence check, so a
/// missing task is 404 and a foreign task is 403; listing filters in the
/// query instead.
///
/// # Endpoints
///
/// - `POST   /api/v1/tasks` - Create a task
/// - `GET    /api/v1/tasks` - List tasks (own tasks; admins see all)
/// - `GET    /api/v1/tasks/:id` - Get a single task
/// - `PATCH  /api/v1/tasks/:id` - Partially update a task
/// - `DELETE /api/v1/tasks/:id` - Delete a task

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, FieldError},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::{middleware::AuthContext, policy},
    models::task::{CreateTask, Task, TaskStatus, UpdateTask},
};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Create task request
///
/// There is deliberately no `owner` field: the owner is always the
/// authenticated caller, and any stray owner key in the body is ignored.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(custom(function = "validate_title"))]
    pub title: String,

    /// Optional description; defaults to an empty string
    pub description: Option<String>,

    /// Optional status; defaults to "todo"
    #[validate(custom(function = "validate_status"))]
    pub status: Option<String>,
}

/// Partial update request; absent fields are left untouched
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// New title
    #[validate(custom(function = "validate_title"))]
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New status
    #[validate(custom(function = "validate_status"))]
    pub status: Option<String>,
}

/// Single-task response
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    /// The task
    pub task: Task,
}

/// Task list response
#[derive(Debug, Serialize)]
pub struct ListTasksResponse {
    /// Tasks, newest-created first
    pub items: Vec<Task>,
}

/// Delete confirmation response
#[derive(Debug, Serialize)]
pub struct DeleteTaskResponse {
    /// Confirmation message
    pub message: String,
}

fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        let mut err = ValidationError::new("title");
        err.message = Some("Title is required".into());
        return Err(err);
    }
    Ok(())
}

fn validate_status(status: &str) -> Result<(), ValidationError> {
    if status.parse::<TaskStatus>().is_err() {
        let mut err = ValidationError::new("status");
        err.message = Some("Status must be one of todo, in_progress, done".into());
        return Err(err);
    }
    Ok(())
}

/// Parses an already-validated status string
fn parse_status(status: Option<&str>) -> Result<Option<TaskStatus>, ApiError> {
    status
        .map(|raw| {
            raw.parse::<TaskStatus>().map_err(|_| {
                ApiError::ValidationFailed(vec![FieldError {
                    field: "status".to_string(),
                    message: "Status must be one of todo, in_progress, done".to_string(),
                }])
            })
        })
        .transpose()
}

/// Create a task
///
/// The owner is forced to the authenticated caller; description defaults to
/// empty, status to "todo".
///
/// # Errors
///
/// - `400 Bad Request`: empty title or unknown status
/// - `401 Unauthorized`: missing or invalid bearer token
/// - `500 Internal Server Error`: store failure
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    req.validate()?;

    let status = parse_status(req.status.as_deref())?.unwrap_or(TaskStatus::Todo);

    let task = Task::create(
        &state.db,
        CreateTask {
            owner_id: auth.user_id,
            title: req.title.trim().to_string(),
            description: req
                .description
                .map(|d| d.trim().to_string())
                .unwrap_or_default(),
            status,
        },
    )
    .await?;

    tracing::debug!(task_id = %task.id, owner_id = %task.owner_id, "Task created");

    Ok((StatusCode::CREATED, Json(TaskResponse { task })))
}

/// List tasks, newest-created first
///
/// Admins see every task; everyone else sees only their own. The filter is
/// part of the query, not applied after the fact.
///
/// # Errors
///
/// - `401 Unauthorized`: missing or invalid bearer token
/// - `500 Internal Server Error`: store failure
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ListTasksResponse>> {
    let items = if auth.is_admin() {
        Task::list_all(&state.db).await?
    } else {
        Task::list_by_owner(&state.db, auth.user_id).await?
    };

    Ok(Json(ListTasksResponse { items }))
}

/// Get a single task
///
/// # Errors
///
/// - `401 Unauthorized`: missing or invalid bearer token
/// - `403 Forbidden`: caller is neither the owner nor an admin
/// - `404 Not Found`: no task with that id
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskResponse>> {
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    policy::require_access(task.owner_id, &auth)?;

    Ok(Json(TaskResponse { task }))
}

/// Partially update a task
///
/// Only the fields present in the patch (title, description, status) are
/// written; everything else keeps its prior value.
///
/// # Errors
///
/// - `400 Bad Request`: empty title or unknown status
/// - `401 Unauthorized`: missing or invalid bearer token
/// - `403 Forbidden`: caller is neither the owner nor an admin
/// - `404 Not Found`: no task with that id
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    req.validate()?;

    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    policy::require_access(task.owner_id, &auth)?;

    let patch = UpdateTask {
        title: req.title.map(|t| t.trim().to_string()),
        description: req.description.map(|d| d.trim().to_string()),
        status: parse_status(req.status.as_deref())?,
    };

    let task = Task::update(&state.db, task.id, patch)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(TaskResponse { task }))
}

/// Delete a task
///
/// # Errors
///
/// - `401 Unauthorized`: missing or invalid bearer token
/// - `403 Forbidden`: caller is neither the owner nor an admin
/// - `404 Not Found`: no task with that id
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteTaskResponse>> {
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    policy::require_access(task.owner_id, &auth)?;

    Task::delete(&state.db, task.id).await?;

    tracing::debug!(task_id = %task.id, "Task deleted");

    Ok(Json(DeleteTaskResponse {
        message: "Task deleted".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_validation() {
        let valid = CreateTaskRequest {
            title: "Write spec".to_string(),
            description: None,
            status: None,
        };
        assert!(valid.validate().is_ok());

        let blank_title = CreateTaskRequest {
            title: "  ".to_string(),
            description: None,
            status: None,
        };
        assert!(blank_title.validate().is_err());

        let bad_status = CreateTaskRequest {
            title: "Write spec".to_string(),
            description: None,
            status: Some("doing".to_string()),
        };
        assert!(bad_status.validate().is_err());

        let valid_status = CreateTaskRequest {
            title: "Write spec".to_string(),
            description: Some("details".to_string()),
            status: Some("in_progress".to_string()),
        };
        assert!(valid_status.validate().is_ok());
    }

    #[test]
    fn test_update_request_validation() {
        // Empty patch is a valid request; it just writes nothing
        let empty = UpdateTaskRequest {
            title: None,
            description: None,
            status: None,
        };
        assert!(empty.validate().is_ok());

        let blank_title = UpdateTaskRequest {
            title: Some("  ".to_string()),
            description: None,
            status: None,
        };
        assert!(blank_title.validate().is_err());

        let status_only = UpdateTaskRequest {
            title: None,
            description: None,
            status: Some("done".to_string()),
        };
        assert!(status_only.validate().is_ok());
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status(None).unwrap(), None);
        assert_eq!(
            parse_status(Some("done")).unwrap(),
            Some(TaskStatus::Done)
        );
        assert!(parse_status(Some("doing")).is_err());
    }

    #[test]
    fn test_create_request_ignores_unknown_fields() {
        // A caller-supplied owner field is dropped during deserialization
        let json = r#"{"title": "Write spec", "owner": "someone-else"}"#;
        let req: CreateTaskRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.title, "Write spec");
    }
}
