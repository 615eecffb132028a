/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth/register` - Register new user
/// - `POST /auth/login` - Exchange credentials for an access token
/// - `GET /auth/me` - Profile of the token's owner

use crate::{app::AppState, error::ApiResult, routes::json_body};
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::middleware::AuthContext,
    models::user::UserProfile,
    services::auth::{AccessToken, Registered},
};
use uuid::Uuid;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

impl RegisterRequest {
    /// Trims name and email so validation sees what the service will store
    fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            ..self
        }
    }
}

/// Register response
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub id: Uuid,
    pub email: String,
}

impl From<Registered> for RegisterResponse {
    fn from(r: Registered) -> Self {
        Self {
            id: r.id,
            email: r.email,
        }
    }
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl LoginRequest {
    fn trimmed(self) -> Self {
        Self {
            email: self.email.trim().to_string(),
            ..self
        }
    }
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests
    pub access_token: String,
}

impl From<AccessToken> for LoginResponse {
    fn from(t: AccessToken) -> Self {
        Self {
            access_token: t.access_token,
        }
    }
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /auth/register
/// Content-Type: application/json
///
/// { "name": "Ana", "email": "ana@example.com", "password": "secret123" }
/// ```
///
/// # Response
///
/// `201 Created` with `{ "id": "uuid", "email": "ana@example.com" }`
///
/// # Errors
///
/// - `401 Unauthorized` with `error: "conflict"`: Email already exists
/// - `422 Unprocessable Entity`: Validation failed
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let req = json_body(payload)?.trimmed();
    req.validate()?;

    let registered = state
        .auth
        .register(&req.name, &req.email, &req.password)
        .await?;

    Ok((StatusCode::CREATED, Json(registered.into())))
}

/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /auth/login
/// Content-Type: application/json
///
/// { "email": "ana@example.com", "password": "secret123" }
/// ```
///
/// # Response
///
/// `200 OK` with `{ "access_token": "eyJ..." }`
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid credentials (unknown email and wrong password look the same)
/// - `422 Unprocessable Entity`: Validation failed
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let req = json_body(payload)?.trimmed();
    req.validate()?;

    let token = state.auth.login(&req.email, &req.password).await?;

    Ok(Json(token.into()))
}

/// Current user's profile
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserProfile>> {
    Ok(Json(state.auth.profile(auth.user_id).await?))
}
