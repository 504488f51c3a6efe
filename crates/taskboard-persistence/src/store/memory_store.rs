use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use taskboard_core::TaskboardResult;
use taskboard_domain::{NewTask, Task, TaskId, TaskPatch, TaskQuery, TaskStore};

use super::collection;

/// Process-local task store for tests and embedding hosts.
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    tasks: RwLock<Vec<Task>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: RwLock::new(tasks),
        }
    }

    /// Copy of the stored tasks in insertion order.
    pub fn snapshot(&self) -> Vec<Task> {
        self.tasks.read().clone()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn list(&self, query: &TaskQuery) -> TaskboardResult<Vec<Task>> {
        Ok(query.run(self.tasks.read().iter()))
    }

    async fn get(&self, id: &TaskId) -> TaskboardResult<Task> {
        collection::get(&self.tasks.read(), id)
    }

    async fn create(&self, task: NewTask) -> TaskboardResult<Task> {
        let created = collection::insert(&mut self.tasks.write(), task, Utc::now());
        tracing::debug!(task_id = %created.id, "Created task");
        Ok(created)
    }

    async fn update(&self, id: &TaskId, patch: TaskPatch) -> TaskboardResult<Task> {
        collection::update(&mut self.tasks.write(), id, &patch, Utc::now())
    }

    async fn delete(&self, id: &TaskId) -> TaskboardResult<()> {
        collection::remove(&mut self.tasks.write(), id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskboard_core::TaskboardError;
    use taskboard_domain::TaskStatus;

    #[tokio::test]
    async fn test_create_assigns_identity() {
        let store = InMemoryTaskStore::new();
        let a = store.create(NewTask::new("p-1", "w-1", "A")).await.unwrap();
        let b = store.create(NewTask::new("p-1", "w-1", "B")).await.unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(store.get(&a.id).await.unwrap().title, "A");
        assert_eq!(store.snapshot().len(), 2);
    }

    #[tokio::test]
    async fn test_update_is_partial_and_stamps_updated_at() {
        let store = InMemoryTaskStore::new();
        let created = store
            .create(NewTask::new("p-1", "w-1", "Reconcile"))
            .await
            .unwrap();

        let updated = store
            .update(&created.id, TaskPatch::new().status(TaskStatus::Review))
            .await
            .unwrap();

        assert_eq!(updated.status, TaskStatus::Review);
        assert_eq!(updated.title, "Reconcile");
        assert_eq!(updated.order, created.order);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_missing_task_is_not_found() {
        let store = InMemoryTaskStore::new();
        let missing = TaskId::new("nope");

        assert!(matches!(
            store.update(&missing, TaskPatch::new().order(1)).await,
            Err(TaskboardError::NotFound(_))
        ));
        assert!(matches!(
            store.delete(&missing).await,
            Err(TaskboardError::NotFound(_))
        ));
        assert!(store.get(&missing).await.is_err());
    }

    #[tokio::test]
    async fn test_list_applies_query() {
        let store = InMemoryTaskStore::new();
        store
            .create(NewTask::new("p-1", "w-1", "One").with_status(TaskStatus::Done))
            .await
            .unwrap();
        store.create(NewTask::new("p-2", "w-1", "Two")).await.unwrap();

        let done = store
            .list(&TaskQuery::all().status(TaskStatus::Done))
            .await
            .unwrap();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].title, "One");

        let p2 = store.list(&TaskQuery::for_project("p-2")).await.unwrap();
        assert_eq!(p2[0].title, "Two");
    }

    #[tokio::test]
    async fn test_delete_removes_task() {
        let store = InMemoryTaskStore::new();
        let task = store.create(NewTask::new("p-1", "w-1", "Gone")).await.unwrap();
        store.delete(&task.id).await.unwrap();
        assert!(store.snapshot().is_empty());
    }
}
