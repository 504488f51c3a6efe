use async_trait::async_trait;
use taskboard_core::TaskboardResult;

use crate::patch::TaskPatch;
use crate::query::TaskQuery;
use crate::task::{NewTask, Task, TaskId};

/// Entity-collection interface for tasks.
///
/// Each call is atomic on its own; nothing spans calls. Concurrent writers
/// race and the last `update` wins.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn list(&self, query: &TaskQuery) -> TaskboardResult<Vec<Task>>;

    async fn get(&self, id: &TaskId) -> TaskboardResult<Task>;

    /// Assigns the id and timestamps.
    async fn create(&self, task: NewTask) -> TaskboardResult<Task>;

    /// Partial update; unset patch fields are left unchanged.
    async fn update(&self, id: &TaskId, patch: TaskPatch) -> TaskboardResult<Task>;

    async fn delete(&self, id: &TaskId) -> TaskboardResult<()>;
}
