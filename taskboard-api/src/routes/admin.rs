/// Administrator views
///
/// Read-only. Holding the `admin` role does not grant write access to other
/// users' tasks; those still go through the owner-scoped task endpoints.
///
/// - `GET /admin/users` - Every user with role counts
/// - `GET /admin/tasks` - Every task, newest first

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use taskboard_shared::{
    auth::middleware::{require_role, AuthContext},
    models::{task::Task, user::Role},
    services::auth::UserDirectory,
};

pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserDirectory>> {
    require_role(&auth, Role::Admin)?;

    Ok(Json(state.auth.list_users().await?))
}

pub async fn list_all_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Task>>> {
    require_role(&auth, Role::Admin)?;

    Ok(Json(state.tasks.list_all().await?))
}
