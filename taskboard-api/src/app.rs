/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskboard_api::{app::{build_router, AppState}, config::Config};
/// use taskboard_shared::store::memory::MemoryStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryStore::new()), config);
/// let app = build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::security::SecurityHeadersLayer, routes};
use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};
use chrono::Duration;
use std::sync::Arc;
use taskboard_shared::{
    auth::{jwt::TokenIssuer, middleware::jwt_auth},
    services::{auth::AuthService, tasks::TaskService},
    store::Store,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Every field is an `Arc` underneath, so clones are cheap.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,

    pub auth: AuthService,

    pub tasks: TaskService,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires services over `store` using the JWT and bootstrap settings in `config`
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        let tokens = TokenIssuer::new(
            config.jwt.secret.clone(),
            Duration::hours(config.jwt.expiration_hours),
        );
        let auth = AuthService::new(store.clone(), tokens)
            .with_first_user_admin(config.bootstrap_first_admin);
        let tasks = TaskService::new(store.clone());

        Self {
            store,
            auth,
            tasks,
            config: Arc::new(config),
        }
    }

    pub fn tokens(&self) -> &TokenIssuer {
        self.auth.tokens()
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET /health                 # public
/// ├── /auth/
/// │   ├── POST /register          # public
/// │   ├── POST /login             # public
/// │   └── GET  /me                # bearer
/// ├── /tasks/                     # bearer
/// │   ├── POST   /
/// │   ├── GET    /
/// │   ├── GET    /stats
/// │   ├── GET    /:id
/// │   ├── DELETE /:id
/// │   └── PATCH  /:id/status
/// └── /admin/                     # bearer + admin role
///     ├── GET /users
///     └── GET /tasks
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Security headers
/// 2. CORS (tower-http CorsLayer)
/// 3. Logging (tower-http TraceLayer)
/// 4. Bearer-token guard (per router)
pub fn build_router(state: AppState) -> Router {
    let guard = from_fn_with_state(state.tokens().clone(), jwt_auth);

    let public_auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    let private_auth_routes = Router::new()
        .route("/me", get(routes::auth::me))
        .layer(guard.clone());

    let task_routes = Router::new()
        .route("/", post(routes::tasks::create_task).get(routes::tasks::list_tasks))
        .route("/stats", get(routes::tasks::task_stats))
        .route("/:id", get(routes::tasks::get_task).delete(routes::tasks::delete_task))
        .route("/:id/status", patch(routes::tasks::update_task_status))
        .layer(guard.clone());

    let admin_routes = Router::new()
        .route("/users", get(routes::admin::list_users))
        .route("/tasks", get(routes::admin::list_all_tasks))
        .layer(guard);

    let cors = cors_layer(&state.config.api.cors_origins);
    let production = state.config.api.production;

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/auth", public_auth_routes.merge(private_auth_routes))
        .nest("/tasks", task_routes)
        .nest("/admin", admin_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(production))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskboard_shared::{models::user::Role, store::memory::MemoryStore};
    use uuid::Uuid;

    #[test]
    fn test_app_state_tokens_use_configured_secret() {
        let state = AppState::new(
            Arc::new(MemoryStore::new()),
            Config::for_memory("test-secret-key-at-least-32-bytes-long"),
        );

        let token = state.tokens().issue(Uuid::new_v4(), "a@x.com", Role::User).unwrap();
        let claims = taskboard_shared::auth::jwt::validate_token(
            &token,
            "test-secret-key-at-least-32-bytes-long",
        )
        .unwrap();
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(state.tokens().lifetime(), Duration::hours(24));
    }

    #[test]
    fn test_cors_layer_builds_for_explicit_origins() {
        let _ = cors_layer(&["http://localhost:5173".to_string()]);
        let _ = cors_layer(&["*".to_string()]);
    }
}
