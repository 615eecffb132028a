/// Typed HTTP client for the Taskboard API
///
/// Authenticated calls take the [`Session`] explicitly and attach its token
/// as `Authorization: Bearer`. Calls made without an authenticated session
/// fail locally with [`ClientError::NotAuthenticated`] and never reach the
/// server.
///
/// # Example
///
/// ```no_run
/// use taskboard_client::{api::ApiClient, session::Session, token_store::MemoryTokenStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ApiClient::new("http://localhost:3000")?;
/// let mut session = Session::load(MemoryTokenStore::new())?;
///
/// let token = client.login("ana@example.com", "secret123").await?;
/// session.login(token)?;
///
/// for task in client.list_tasks(&session).await? {
///     println!("{} {}", task.status, task.title);
/// }
/// # Ok(())
/// # }
/// ```

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use crate::{
    session::Session,
    token_store::TokenStore,
    types::{
        ErrorBody, FieldError, Health, Registered, Task, TaskStats, TaskStatus, UserDirectory,
        UserProfile,
    },
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Server answered with a non-2xx status
    #[error("{message} ({status}, {error})")]
    Api {
        status: StatusCode,
        error: String,
        message: String,
        details: Vec<FieldError>,
    },

    #[error("not logged in (or the session expired); run `taskboard login`")]
    NotAuthenticated,

    #[error("invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Machine-readable error code from the response body
    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::Api { error, .. } => Some(error.as_str()),
            _ => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Deserialize)]
struct LoginResponse {
    access_token: String,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidUrl(base_url));
        }

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("taskboard-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    fn authed<S: TokenStore>(
        &self,
        session: &Session<S>,
        method: Method,
        path: &str,
    ) -> ClientResult<RequestBuilder> {
        let token = session.token().ok_or(ClientError::NotAuthenticated)?;
        Ok(self.request(method, path).bearer_auth(token))
    }

    async fn send(builder: RequestBuilder) -> ClientResult<Response> {
        let response = builder.send().await?;
        let status = response.status();
        debug!(status = %status, url = %response.url(), "Response received");

        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        Err(match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => ClientError::Api {
                status,
                error: body.error,
                message: body.message,
                details: body.details,
            },
            Err(_) => ClientError::Api {
                status,
                error: "http_error".to_string(),
                message: if text.is_empty() {
                    status.canonical_reason().unwrap_or("request failed").to_string()
                } else {
                    text
                },
                details: Vec::new(),
            },
        })
    }

    async fn json<T: DeserializeOwned>(builder: RequestBuilder) -> ClientResult<T> {
        Ok(Self::send(builder).await?.json::<T>().await?)
    }

    pub async fn health(&self) -> ClientResult<Health> {
        Self::json(self.request(Method::GET, "/health")).await
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> ClientResult<Registered> {
        let body = json!({ "name": name, "email": email, "password": password });
        Self::json(self.request(Method::POST, "/auth/register").json(&body)).await
    }

    /// Returns the access token; hand it to [`Session::login`]
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<String> {
        let body = json!({ "email": email, "password": password });
        let response: LoginResponse =
            Self::json(self.request(Method::POST, "/auth/login").json(&body)).await?;
        Ok(response.access_token)
    }

    pub async fn me<S: TokenStore>(&self, session: &Session<S>) -> ClientResult<UserProfile> {
        Self::json(self.authed(session, Method::GET, "/auth/me")?).await
    }

    pub async fn create_task<S: TokenStore>(
        &self,
        session: &Session<S>,
        title: &str,
        description: Option<&str>,
    ) -> ClientResult<Task> {
        let body = json!({ "title": title, "description": description });
        Self::json(self.authed(session, Method::POST, "/tasks")?.json(&body)).await
    }

    pub async fn list_tasks<S: TokenStore>(&self, session: &Session<S>) -> ClientResult<Vec<Task>> {
        Self::json(self.authed(session, Method::GET, "/tasks")?).await
    }

    pub async fn get_task<S: TokenStore>(&self, session: &Session<S>, id: Uuid) -> ClientResult<Task> {
        Self::json(self.authed(session, Method::GET, &format!("/tasks/{}", id))?).await
    }

    pub async fn update_status<S: TokenStore>(
        &self,
        session: &Session<S>,
        id: Uuid,
        status: TaskStatus,
    ) -> ClientResult<Task> {
        let body = json!({ "status": status });
        let path = format!("/tasks/{}/status", id);
        Self::json(self.authed(session, Method::PATCH, &path)?.json(&body)).await
    }

    pub async fn delete_task<S: TokenStore>(&self, session: &Session<S>, id: Uuid) -> ClientResult<()> {
        Self::send(self.authed(session, Method::DELETE, &format!("/tasks/{}", id))?).await?;
        Ok(())
    }

    pub async fn task_stats<S: TokenStore>(&self, session: &Session<S>) -> ClientResult<TaskStats> {
        Self::json(self.authed(session, Method::GET, "/tasks/stats")?).await
    }

    pub async fn list_users<S: TokenStore>(&self, session: &Session<S>) -> ClientResult<UserDirectory> {
        Self::json(self.authed(session, Method::GET, "/admin/users")?).await
    }

    pub async fn list_all_tasks<S: TokenStore>(&self, session: &Session<S>) -> ClientResult<Vec<Task>> {
        Self::json(self.authed(session, Method::GET, "/admin/tasks")?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token_store::MemoryTokenStore;

    #[test]
    fn test_base_url_is_normalised() {
        let client = ApiClient::new("http://localhost:3000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
    }

    #[test]
    fn test_rejects_url_without_scheme() {
        assert!(matches!(
            ApiClient::new("localhost:3000"),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_authenticated_call_without_session_fails_locally() {
        // nothing listens here; the call must not get that far
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        let session = Session::load(MemoryTokenStore::new()).unwrap();

        assert!(matches!(
            client.list_tasks(&session).await,
            Err(ClientError::NotAuthenticated)
        ));
    }
}
