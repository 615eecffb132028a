/// PostgreSQL-backed [`Store`]

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::{
    db::pool,
    models::{
        task::{CreateTask, Task, TaskStats, TaskStatus},
        user::{CreateUser, User},
    },
};

const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Store over a sqlx connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn map_insert_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() && db_err.constraint() == Some(EMAIL_CONSTRAINT) {
            return StoreError::DuplicateEmail;
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> StoreResult<()> {
        pool::health_check(&self.pool).await?;
        Ok(())
    }

    async fn insert_user(&self, data: CreateUser) -> StoreResult<User> {
        User::create(&self.pool, data).await.map_err(map_insert_error)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(User::list(&self.pool).await?)
    }

    async fn insert_task(&self, data: CreateTask) -> StoreResult<Task> {
        Ok(Task::create(&self.pool, data).await?)
    }

    async fn find_task(&self, id: Uuid, owner_id: Uuid) -> StoreResult<Option<Task>> {
        Ok(Task::find_by_id_and_owner(&self.pool, id, owner_id).await?)
    }

    async fn list_tasks_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Task>> {
        Ok(Task::list_by_owner(&self.pool, owner_id).await?)
    }

    async fn list_all_tasks(&self) -> StoreResult<Vec<Task>> {
        Ok(Task::list_all(&self.pool).await?)
    }

    async fn update_task_status(
        &self,
        id: Uuid,
        owner_id: Uuid,
        status: TaskStatus,
    ) -> StoreResult<Option<Task>> {
        Ok(Task::update_status_for_owner(&self.pool, id, owner_id, status).await?)
    }

    async fn delete_task(&self, id: Uuid, owner_id: Uuid) -> StoreResult<bool> {
        Ok(Task::delete_for_owner(&self.pool, id, owner_id).await?)
    }

    async fn task_stats(&self, owner_id: Uuid) -> StoreResult<TaskStats> {
        Ok(Task::stats_for_owner(&self.pool, owner_id).await?)
    }
}
