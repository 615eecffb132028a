/// Task endpoints
///
/// Every handler runs behind the bearer-token guard and acts only on the
/// caller's own tasks. A task owned by someone else, a task that does not
/// exist and a path segment that is not a UUID all answer `404`.
///
/// # Endpoints
///
/// - `POST /tasks` - Create a task
/// - `GET /tasks` - List own tasks, newest first
/// - `GET /tasks/stats` - Per-status counts
/// - `GET /tasks/:id` - Fetch one task
/// - `PATCH /tasks/:id/status` - Set status
/// - `DELETE /tasks/:id` - Delete a task

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::json_body,
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::middleware::AuthContext,
    models::task::{Task, TaskStats, TaskStatus},
};
use uuid::Uuid;
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: String,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
}

/// Status update request
///
/// Unknown status strings fail deserialization.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: TaskStatus,
}

fn parse_task_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound("Task not found".to_string()))
}

/// Create a task
///
/// ```text
/// POST /tasks
/// Authorization: Bearer <token>
///
/// { "title": "Write report", "description": "Q3 numbers" }
/// ```
///
/// Returns `201 Created` with the task in `pending` status.
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let req = json_body(payload)?;
    req.validate()?;

    let task = state
        .tasks
        .create(auth.user_id, &req.title, req.description.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// List the caller's tasks, newest first
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(state.tasks.list_mine(auth.user_id).await?))
}

pub async fn task_stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<TaskStats>> {
    Ok(Json(state.tasks.stats(auth.user_id).await?))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let id = parse_task_id(&id)?;
    Ok(Json(state.tasks.get(auth.user_id, id).await?))
}

/// Set a task's status
///
/// ```text
/// PATCH /tasks/:id/status
/// Authorization: Bearer <token>
///
/// { "status": "in_progress" }
/// ```
///
/// Any status may follow any other.
pub async fn update_task_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let id = parse_task_id(&id)?;
    let req = json_body(payload)?;

    let task = state
        .tasks
        .update_status(auth.user_id, id, req.status)
        .await?;

    Ok(Json(task))
}

/// Delete a task; `204 No Content` on success
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_task_id(&id)?;
    state.tasks.delete(auth.user_id, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
