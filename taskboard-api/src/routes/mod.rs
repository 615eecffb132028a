/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, current profile
/// - `tasks`: Owner-scoped task CRUD
/// - `admin`: Read-only views across all users

pub mod admin;
pub mod auth;
pub mod health;
pub mod tasks;

use crate::error::{ApiError, ApiResult};
use axum::{extract::rejection::JsonRejection, Json};

/// Unwraps a JSON body, turning extractor rejections into `422` errors
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::invalid("body", rejection.body_text()))
}
