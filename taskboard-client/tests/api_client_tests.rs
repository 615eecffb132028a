/// End-to-end tests: the typed client against a real server
///
/// Each test binds the API router with an in-memory store to an ephemeral
/// local port.

use reqwest::StatusCode;
use std::sync::Arc;
use taskboard_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskboard_client::{
    types::TaskStatus, ApiClient, ClientError, MemoryTokenStore, Role, Session,
};
use taskboard_shared::store::memory::MemoryStore;
use tokio::net::TcpListener;

const SECRET: &str = "client-test-secret-at-least-32-bytes";

async fn spawn_server(bootstrap_first_admin: bool) -> ApiClient {
    let mut config = Config::for_memory(SECRET);
    config.bootstrap_first_admin = bootstrap_first_admin;
    let app = build_router(AppState::new(Arc::new(MemoryStore::new()), config));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    ApiClient::new(format!("http://{}", addr)).unwrap()
}

async fn signed_in(client: &ApiClient, email: &str) -> Session<MemoryTokenStore> {
    client.register("Test", email, "secret123").await.unwrap();
    let token = client.login(email, "secret123").await.unwrap();

    let mut session = Session::load(MemoryTokenStore::new()).unwrap();
    session.login(token).unwrap();
    session
}

#[tokio::test]
async fn test_health() {
    let client = spawn_server(false).await;
    let health = client.health().await.unwrap();

    assert_eq!(health.status, "healthy");
    assert_eq!(health.backend, "memory");
}

#[tokio::test]
async fn test_session_from_login_token() {
    let client = spawn_server(false).await;
    let session = signed_in(&client, "ana@x.com").await;

    assert!(session.is_authenticated());
    assert_eq!(session.role(), Some(Role::User));

    let me = client.me(&session).await.unwrap();
    assert_eq!(me.email, "ana@x.com");
    assert_eq!(Some(me.id), session.user_id());
}

#[tokio::test]
async fn test_task_round_trip() {
    let client = spawn_server(false).await;
    let session = signed_in(&client, "ana@x.com").await;

    let task = client
        .create_task(&session, "Write report", Some("Q3"))
        .await
        .unwrap();
    assert_eq!(task.status, TaskStatus::Pending);

    let updated = client
        .update_status(&session, task.id, TaskStatus::Completed)
        .await
        .unwrap();
    assert_eq!(updated.status, TaskStatus::Completed);

    let stats = client.task_stats(&session).await.unwrap();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.completed, 1);

    client.delete_task(&session, task.id).await.unwrap();
    assert!(client.list_tasks(&session).await.unwrap().is_empty());

    let err = client.get_task(&session, task.id).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    assert_eq!(err.code(), Some("not_found"));
}

#[tokio::test]
async fn test_api_errors_carry_code_and_message() {
    let client = spawn_server(false).await;
    client.register("Ana", "ana@x.com", "secret123").await.unwrap();

    let duplicate = client
        .register("Ana", "ana@x.com", "secret123")
        .await
        .unwrap_err();
    assert_eq!(duplicate.status(), Some(StatusCode::UNAUTHORIZED));
    assert_eq!(duplicate.code(), Some("conflict"));

    let bad_login = client.login("ana@x.com", "wrong-password").await.unwrap_err();
    match bad_login {
        ClientError::Api { status, error, .. } => {
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(error, "unauthorized");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_admin_views() {
    let client = spawn_server(true).await;
    let admin = signed_in(&client, "admin@x.com").await;
    let user = signed_in(&client, "user@x.com").await;

    assert!(admin.is_admin());
    assert!(!user.is_admin());

    let directory = client.list_users(&admin).await.unwrap();
    assert_eq!(directory.total, 2);
    assert_eq!(directory.admins, 1);

    let forbidden = client.list_all_tasks(&user).await.unwrap_err();
    assert_eq!(forbidden.status(), Some(StatusCode::FORBIDDEN));
}
