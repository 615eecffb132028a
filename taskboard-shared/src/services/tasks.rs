/// Owner-scoped task operations
///
/// Every method except [`TaskService::list_all`] takes the caller's user ID
/// and only ever touches tasks owned by that user. Someone else's task is
/// reported as `NotFound`, the same as a task that does not exist.

use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    error::{ServiceError, ServiceResult},
    models::task::{CreateTask, Task, TaskStats, TaskStatus},
    store::Store,
};

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 2000;

const TASK_NOT_FOUND: &str = "Task not found";

#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn Store>,
}

impl TaskService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Creates a `pending` task owned by `owner_id`
    ///
    /// The title is trimmed and must be non-empty. A blank description is
    /// stored as absent.
    pub async fn create(
        &self,
        owner_id: Uuid,
        title: &str,
        description: Option<&str>,
    ) -> ServiceResult<Task> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ServiceError::invalid("title", "Title is required"));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(ServiceError::invalid(
                "title",
                format!("Title must be at most {} characters", MAX_TITLE_LEN),
            ));
        }

        let description = description.map(str::trim).filter(|d| !d.is_empty());
        if description.is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LEN) {
            return Err(ServiceError::invalid(
                "description",
                format!("Description must be at most {} characters", MAX_DESCRIPTION_LEN),
            ));
        }

        let task = self
            .store
            .insert_task(CreateTask {
                title: title.to_string(),
                description: description.map(str::to_string),
                owner_id,
            })
            .await?;

        info!(task_id = %task.id, owner_id = %owner_id, "Task created");
        Ok(task)
    }

    /// Caller's tasks, newest first
    pub async fn list_mine(&self, owner_id: Uuid) -> ServiceResult<Vec<Task>> {
        Ok(self.store.list_tasks_by_owner(owner_id).await?)
    }

    pub async fn get(&self, owner_id: Uuid, task_id: Uuid) -> ServiceResult<Task> {
        self.store
            .find_task(task_id, owner_id)
            .await?
            .ok_or_else(not_found)
    }

    /// Sets the status of an owned task
    ///
    /// Any status may follow any other. `updated_at` moves even when the
    /// status is unchanged.
    pub async fn update_status(
        &self,
        owner_id: Uuid,
        task_id: Uuid,
        status: TaskStatus,
    ) -> ServiceResult<Task> {
        let task = self
            .store
            .update_task_status(task_id, owner_id, status)
            .await?
            .ok_or_else(|| {
                debug!(task_id = %task_id, owner_id = %owner_id, "Status update on unknown task");
                not_found()
            })?;

        info!(task_id = %task.id, status = %task.status, "Task status updated");
        Ok(task)
    }

    pub async fn delete(&self, owner_id: Uuid, task_id: Uuid) -> ServiceResult<()> {
        if !self.store.delete_task(task_id, owner_id).await? {
            debug!(task_id = %task_id, owner_id = %owner_id, "Delete of unknown task");
            return Err(not_found());
        }

        info!(task_id = %task_id, "Task deleted");
        Ok(())
    }

    /// Per-status counts over the caller's tasks
    pub async fn stats(&self, owner_id: Uuid) -> ServiceResult<TaskStats> {
        Ok(self.store.task_stats(owner_id).await?)
    }

    /// Every task of every owner, newest first
    ///
    /// Callers must check the admin role first.
    pub async fn list_all(&self) -> ServiceResult<Vec<Task>> {
        Ok(self.store.list_all_tasks().await?)
    }
}

fn not_found() -> ServiceError {
    ServiceError::NotFound(TASK_NOT_FOUND.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    fn service() -> TaskService {
        TaskService::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_create_trims_and_defaults() {
        let tasks = service();
        let owner = Uuid::new_v4();

        let task = tasks
            .create(owner, "  Write report  ", Some("   "))
            .await
            .unwrap();

        assert_eq!(task.title, "Write report");
        assert_eq!(task.description, None);
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.owner_id, owner);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_title() {
        let tasks = service();
        let owner = Uuid::new_v4();

        for title in ["", "   "] {
            match tasks.create(owner, title, None).await {
                Err(ServiceError::InvalidInput { field, .. }) => assert_eq!(field, "title"),
                other => panic!("unexpected {:?}", other),
            }
        }

        let long = "x".repeat(MAX_TITLE_LEN + 1);
        assert!(matches!(
            tasks.create(owner, &long, None).await,
            Err(ServiceError::InvalidInput { .. })
        ));
        assert!(tasks.list_mine(owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_owner_isolation() {
        let tasks = service();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let task = tasks.create(alice, "A1", None).await.unwrap();

        assert!(tasks.list_mine(bob).await.unwrap().is_empty());
        assert!(matches!(tasks.get(bob, task.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(
            tasks.update_status(bob, task.id, TaskStatus::Completed).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(tasks.delete(bob, task.id).await, Err(ServiceError::NotFound(_))));

        let still = tasks.get(alice, task.id).await.unwrap();
        assert_eq!(still.status, TaskStatus::Pending);
    }

    #[tokio::test]
    async fn test_any_status_transition_is_allowed() {
        let tasks = service();
        let owner = Uuid::new_v4();
        let task = tasks.create(owner, "T", None).await.unwrap();

        let done = tasks
            .update_status(owner, task.id, TaskStatus::Completed)
            .await
            .unwrap();
        assert_eq!(done.status, TaskStatus::Completed);

        let back = tasks
            .update_status(owner, task.id, TaskStatus::Pending)
            .await
            .unwrap();
        assert_eq!(back.status, TaskStatus::Pending);
        assert!(back.updated_at >= done.updated_at);
    }

    #[tokio::test]
    async fn test_repeated_status_is_idempotent_but_touches_updated_at() {
        let tasks = service();
        let owner = Uuid::new_v4();
        let task = tasks.create(owner, "T", None).await.unwrap();

        let first = tasks
            .update_status(owner, task.id, TaskStatus::Completed)
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = tasks
            .update_status(owner, task.id, TaskStatus::Completed)
            .await
            .unwrap();

        assert_eq!(second.status, TaskStatus::Completed);
        assert_eq!(second.title, first.title);
        assert!(second.updated_at > first.updated_at);

        let stored = tasks.get(owner, task.id).await.unwrap();
        assert_eq!(stored.updated_at, second.updated_at);
    }

    #[tokio::test]
    async fn test_delete_then_missing() {
        let tasks = service();
        let owner = Uuid::new_v4();
        let task = tasks.create(owner, "T", None).await.unwrap();

        tasks.delete(owner, task.id).await.unwrap();

        assert!(matches!(tasks.delete(owner, task.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(
            tasks.update_status(owner, task.id, TaskStatus::Completed).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_stats_and_list_all() {
        let tasks = service();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let a1 = tasks.create(alice, "A1", None).await.unwrap();
        tasks.create(alice, "A2", Some("notes")).await.unwrap();
        tasks.create(bob, "B1", None).await.unwrap();
        tasks
            .update_status(alice, a1.id, TaskStatus::Completed)
            .await
            .unwrap();

        let stats = tasks.stats(alice).await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.in_progress, 0);

        assert_eq!(tasks.list_all().await.unwrap().len(), 3);
    }
}
