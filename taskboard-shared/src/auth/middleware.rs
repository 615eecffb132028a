/// Bearer-token guard for Axum
///
/// The guard reads `Authorization: Bearer <token>`, verifies it with the
/// shared [`TokenIssuer`] and inserts an [`AuthContext`] into the request
/// extensions. Any failure short-circuits with `401` before the handler runs,
/// so a handler that extracts `Extension<AuthContext>` always sees a verified
/// identity.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Extension, Router};
/// use chrono::Duration;
/// use taskboard_shared::auth::{jwt::TokenIssuer, middleware::{jwt_auth, AuthContext}};
///
/// async fn whoami(Extension(auth): Extension<AuthContext>) -> String {
///     auth.email
/// }
///
/// let issuer = TokenIssuer::new("a-secret-that-is-at-least-32-bytes!", Duration::hours(24));
/// let app: Router = Router::new()
///     .route("/me", get(whoami))
///     .layer(middleware::from_fn_with_state(issuer, jwt_auth));
/// ```

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use super::jwt::{Claims, JwtError, TokenIssuer};
use crate::models::user::Role;

/// Verified identity attached to each guarded request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl AuthContext {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// Guard failures
///
/// All authentication failures render as the same generic `401`; the variant
/// only reaches the debug log.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing authorization header")]
    MissingCredentials,

    #[error("malformed authorization header")]
    InvalidFormat,

    #[error("token expired")]
    Expired,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// Authenticated, but the role does not allow the operation
    #[error("requires role {0}")]
    Forbidden(Role),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::Expired,
            other => AuthError::InvalidToken(other.to_string()),
        }
    }
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            AuthError::Forbidden(_) => json!({
                "error": "forbidden",
                "message": "Insufficient permissions",
            }),
            _ => json!({
                "error": "unauthorized",
                "message": "Authentication required",
            }),
        };

        (status, Json(body)).into_response()
    }
}

/// Pulls the token out of an `Authorization` header value
///
/// The scheme is matched case-insensitively; the token must be non-empty.
pub fn bearer_token(header_value: &str) -> Result<&str, AuthError> {
    let (scheme, token) = header_value
        .split_once(' ')
        .ok_or(AuthError::InvalidFormat)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidFormat);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::InvalidFormat);
    }

    Ok(token)
}

/// Axum middleware; use with `middleware::from_fn_with_state(issuer, jwt_auth)`
pub async fn jwt_auth(
    State(issuer): State<TokenIssuer>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let result = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)
        .and_then(|value| value.to_str().map_err(|_| AuthError::InvalidFormat))
        .and_then(bearer_token)
        .and_then(|token| issuer.verify(token).map_err(AuthError::from));

    let claims = match result {
        Ok(claims) => claims,
        Err(e) => {
            debug!(path = %req.uri().path(), reason = %e, "Rejected request");
            return Err(e);
        }
    };

    req.extensions_mut().insert(AuthContext::from(claims));

    Ok(next.run(req).await)
}

/// Checks the caller holds `role`
///
/// Admins satisfy every role check.
pub fn require_role(auth: &AuthContext, role: Role) -> Result<(), AuthError> {
    if auth.role == role || auth.is_admin() {
        Ok(())
    } else {
        Err(AuthError::Forbidden(role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request as HttpRequest, middleware, routing::get, Extension, Router};
    use chrono::Duration;
    use tower::ServiceExt;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(SECRET, Duration::hours(1))
    }

    fn app() -> Router {
        async fn whoami(Extension(auth): Extension<AuthContext>) -> String {
            auth.email
        }

        Router::new()
            .route("/me", get(whoami))
            .layer(middleware::from_fn_with_state(issuer(), jwt_auth))
    }

    async fn call(authorization: Option<&str>) -> StatusCode {
        let mut builder = HttpRequest::builder().uri("/me");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }

        app()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc").unwrap(), "abc");
        assert_eq!(bearer_token("bearer abc").unwrap(), "abc");
        assert!(matches!(bearer_token("Basic abc"), Err(AuthError::InvalidFormat)));
        assert!(matches!(bearer_token("Bearer "), Err(AuthError::InvalidFormat)));
        assert!(matches!(bearer_token("abc"), Err(AuthError::InvalidFormat)));
    }

    #[test]
    fn test_auth_context_from_claims() {
        let user_id = Uuid::new_v4();
        let context = AuthContext::from(Claims::new(user_id, "ana@x.com", Role::Admin));

        assert_eq!(context.user_id, user_id);
        assert_eq!(context.email, "ana@x.com");
        assert!(context.is_admin());
    }

    #[test]
    fn test_require_role() {
        let user = AuthContext {
            user_id: Uuid::new_v4(),
            email: "u@x.com".to_string(),
            role: Role::User,
        };
        let admin = AuthContext {
            role: Role::Admin,
            ..user.clone()
        };

        assert!(require_role(&user, Role::User).is_ok());
        assert!(matches!(
            require_role(&user, Role::Admin),
            Err(AuthError::Forbidden(Role::Admin))
        ));
        assert!(require_role(&admin, Role::Admin).is_ok());
        assert!(require_role(&admin, Role::User).is_ok());
    }

    #[test]
    fn test_auth_error_status_codes() {
        assert_eq!(AuthError::MissingCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::InvalidFormat.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::Expired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::Forbidden(Role::Admin).into_response().status(),
            StatusCode::FORBIDDEN
        );
    }

    #[tokio::test]
    async fn test_guard_accepts_valid_token() {
        let token = issuer().issue(Uuid::new_v4(), "ana@x.com", Role::User).unwrap();
        assert_eq!(call(Some(&format!("Bearer {}", token))).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_guard_rejects_missing_and_bad_tokens() {
        assert_eq!(call(None).await, StatusCode::UNAUTHORIZED);
        assert_eq!(call(Some("Bearer not.a.jwt")).await, StatusCode::UNAUTHORIZED);
        assert_eq!(call(Some("Token abc")).await, StatusCode::UNAUTHORIZED);

        let foreign = TokenIssuer::new("another-secret-key-at-least-32-bytes", Duration::hours(1))
            .issue(Uuid::new_v4(), "ana@x.com", Role::User)
            .unwrap();
        assert_eq!(
            call(Some(&format!("Bearer {}", foreign))).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_guard_rejects_expired_token() {
        let expired = TokenIssuer::new(SECRET, Duration::hours(-1))
            .issue(Uuid::new_v4(), "ana@x.com", Role::User)
            .unwrap();
        assert_eq!(
            call(Some(&format!("Bearer {}", expired))).await,
            StatusCode::UNAUTHORIZED
        );
    }
}
