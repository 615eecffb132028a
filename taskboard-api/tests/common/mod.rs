/// Common test utilities for integration tests
///
/// Every `TestContext` owns a fresh in-memory store, so tests never share
/// state and need no database.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use taskboard_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskboard_shared::store::memory::MemoryStore;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-key-at-least-32-bytes-long";
pub const PASSWORD: &str = "secret123";

/// Test context containing the router under test
pub struct TestContext {
    pub app: Router,
    pub config: Config,
}

/// Parsed response
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

#[allow(dead_code)]
impl TestContext {
    pub fn new() -> Self {
        Self::with_config(Config::for_memory(TEST_SECRET))
    }

    /// Context where the first registered user becomes admin
    pub fn with_bootstrap_admin() -> Self {
        let mut config = Config::for_memory(TEST_SECRET);
        config.bootstrap_first_admin = true;
        Self::with_config(config)
    }

    pub fn with_config(config: Config) -> Self {
        let state = AppState::new(Arc::new(MemoryStore::new()), config.clone());

        Self {
            app: build_router(state),
            config,
        }
    }

    /// Sends a request through the router
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse { status, body }
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> TestResponse {
        self.send(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "name": name, "email": email, "password": password })),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Registers `email` with [`PASSWORD`] and returns an access token
    pub async fn user_token(&self, email: &str) -> String {
        let registered = self.register("Test User", email, PASSWORD).await;
        assert_eq!(registered.status, StatusCode::CREATED, "{:?}", registered.body);

        let login = self.login(email, PASSWORD).await;
        assert_eq!(login.status, StatusCode::OK, "{:?}", login.body);

        login.body["access_token"]
            .as_str()
            .expect("access_token in login response")
            .to_string()
    }

    /// Creates a task and returns its JSON
    pub async fn create_task(&self, token: &str, title: &str) -> Value {
        let response = self
            .send(
                Method::POST,
                "/tasks",
                Some(token),
                Some(json!({ "title": title })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body
    }
}
