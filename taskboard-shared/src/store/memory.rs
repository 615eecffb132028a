/// In-memory [`Store`]
///
/// Backs tests and `STORAGE_BACKEND=memory` demo runs. All state sits behind
/// a single `tokio::sync::RwLock`; every mutation takes the write lock for
/// its whole check-and-write, which gives the same atomicity as the
/// conditional statements in [`PgStore`](super::postgres::PgStore).
///
/// Data does not survive a restart.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::models::{
    task::{CreateTask, Task, TaskStats, TaskStatus},
    user::{CreateUser, Role, User},
};

#[derive(Debug)]
struct Stored<T> {
    /// Insertion order, breaks `created_at` ties
    seq: u64,
    value: T,
}

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<Uuid, Stored<User>>,
    /// Lower-cased email to user ID
    emails: HashMap<String, Uuid>,
    tasks: HashMap<Uuid, Stored<Task>>,
    next_seq: u64,
}

impl Inner {
    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}

fn newest_first<'a, T: 'a>(
    items: impl Iterator<Item = &'a Stored<T>>,
    created_at: impl Fn(&T) -> chrono::DateTime<Utc>,
) -> Vec<&'a T> {
    let mut items: Vec<&Stored<T>> = items.collect();
    items.sort_by(|a, b| {
        created_at(&b.value)
            .cmp(&created_at(&a.value))
            .then(b.seq.cmp(&a.seq))
    });
    items.into_iter().map(|s| &s.value).collect()
}

/// Volatile store for tests and local runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn insert_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut inner = self.inner.write().await;

        let key = data.email.to_lowercase();
        if inner.emails.contains_key(&key) {
            return Err(StoreError::DuplicateEmail);
        }

        let role = if data.promote_if_first && inner.users.is_empty() {
            Role::Admin
        } else {
            data.role
        };

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: data.name,
            email: data.email,
            password_hash: data.password_hash,
            role,
            created_at: now,
            updated_at: now,
        };

        let seq = inner.next_seq();
        inner.emails.insert(key, user.id);
        inner.users.insert(
            user.id,
            Stored {
                seq,
                value: user.clone(),
            },
        );

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;

        Ok(inner
            .emails
            .get(&email.to_lowercase())
            .and_then(|id| inner.users.get(id))
            .map(|stored| stored.value.clone()))
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&id).map(|stored| stored.value.clone()))
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let inner = self.inner.read().await;

        Ok(newest_first(inner.users.values(), |u| u.created_at)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn insert_task(&self, data: CreateTask) -> StoreResult<Task> {
        let mut inner = self.inner.write().await;

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            title: data.title,
            description: data.description,
            status: TaskStatus::Pending,
            owner_id: data.owner_id,
            created_at: now,
            updated_at: now,
        };

        let seq = inner.next_seq();
        inner.tasks.insert(
            task.id,
            Stored {
                seq,
                value: task.clone(),
            },
        );

        Ok(task)
    }

    async fn find_task(&self, id: Uuid, owner_id: Uuid) -> StoreResult<Option<Task>> {
        let inner = self.inner.read().await;

        Ok(inner
            .tasks
            .get(&id)
            .map(|stored| &stored.value)
            .filter(|task| task.owner_id == owner_id)
            .cloned())
    }

    async fn list_tasks_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Task>> {
        let inner = self.inner.read().await;

        let owned = inner
            .tasks
            .values()
            .filter(|stored| stored.value.owner_id == owner_id);

        Ok(newest_first(owned, |t| t.created_at)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn list_all_tasks(&self) -> StoreResult<Vec<Task>> {
        let inner = self.inner.read().await;

        Ok(newest_first(inner.tasks.values(), |t| t.created_at)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn update_task_status(
        &self,
        id: Uuid,
        owner_id: Uuid,
        status: TaskStatus,
    ) -> StoreResult<Option<Task>> {
        let mut inner = self.inner.write().await;

        Ok(inner
            .tasks
            .get_mut(&id)
            .map(|stored| &mut stored.value)
            .filter(|task| task.owner_id == owner_id)
            .map(|task| {
                task.status = status;
                task.updated_at = Utc::now();
                task.clone()
            }))
    }

    async fn delete_task(&self, id: Uuid, owner_id: Uuid) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;

        let owned = inner
            .tasks
            .get(&id)
            .is_some_and(|stored| stored.value.owner_id == owner_id);
        if owned {
            inner.tasks.remove(&id);
        }

        Ok(owned)
    }

    async fn task_stats(&self, owner_id: Uuid) -> StoreResult<TaskStats> {
        let inner = self.inner.read().await;

        Ok(TaskStats::from_tasks(
            inner
                .tasks
                .values()
                .map(|stored| &stored.value)
                .filter(|task| task.owner_id == owner_id),
        ))
    }
}
