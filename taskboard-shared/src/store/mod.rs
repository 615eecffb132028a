/// Storage abstraction for identities and tasks
///
/// Services talk to a `dyn Store` and never to a concrete database, so the
/// same auth and task logic runs against PostgreSQL in production and the
/// in-memory backend in tests and demos.
///
/// # Backends
///
/// - [`postgres::PgStore`]: sqlx pool, one statement per operation
/// - [`memory::MemoryStore`]: `RwLock`-guarded maps
///
/// # Atomicity
///
/// `update_task_status` and `delete_task` must check ownership and mutate
/// in one atomic step. A task owned by someone else is reported exactly like
/// a missing one (`None` / `false`).

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    task::{CreateTask, Task, TaskStats, TaskStatus},
    user::{CreateUser, User},
};

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Unique email constraint hit
    #[error("email already registered")]
    DuplicateEmail,

    /// Database failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for users and tasks
#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;

    /// Checks the backend is reachable
    async fn ping(&self) -> StoreResult<()>;

    /// Inserts a user; `DuplicateEmail` if the email (case-insensitive) exists
    async fn insert_user(&self, data: CreateUser) -> StoreResult<User>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// All users, newest first
    async fn list_users(&self) -> StoreResult<Vec<User>>;

    /// Inserts a task in `pending` status
    async fn insert_task(&self, data: CreateTask) -> StoreResult<Task>;

    async fn find_task(&self, id: Uuid, owner_id: Uuid) -> StoreResult<Option<Task>>;

    /// Owner's tasks, newest first
    async fn list_tasks_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Task>>;

    /// Every task, newest first
    async fn list_all_tasks(&self) -> StoreResult<Vec<Task>>;

    /// Sets status and `updated_at` on an owned task
    async fn update_task_status(
        &self,
        id: Uuid,
        owner_id: Uuid,
        status: TaskStatus,
    ) -> StoreResult<Option<Task>>;

    /// Deletes an owned task
    async fn delete_task(&self, id: Uuid, owner_id: Uuid) -> StoreResult<bool>;

    async fn task_stats(&self, owner_id: Uuid) -> StoreResult<TaskStats>;
}
