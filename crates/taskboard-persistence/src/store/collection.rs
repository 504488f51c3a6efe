//! Vec-backed task operations shared by the in-process stores.

use chrono::{DateTime, Utc};
use taskboard_core::{TaskboardError, TaskboardResult};
use taskboard_domain::{NewTask, Task, TaskId, TaskPatch};

fn not_found(id: &TaskId) -> TaskboardError {
    TaskboardError::NotFound(format!("task {}", id))
}

pub(crate) fn get(tasks: &[Task], id: &TaskId) -> TaskboardResult<Task> {
    tasks
        .iter()
        .find(|t| &t.id == id)
        .cloned()
        .ok_or_else(|| not_found(id))
}

pub(crate) fn insert(tasks: &mut Vec<Task>, new_task: NewTask, now: DateTime<Utc>) -> Task {
    let task = new_task.into_task(TaskId::generate(), now);
    tasks.push(task.clone());
    task
}

pub(crate) fn update(
    tasks: &mut [Task],
    id: &TaskId,
    patch: &TaskPatch,
    now: DateTime<Utc>,
) -> TaskboardResult<Task> {
    let task = tasks
        .iter_mut()
        .find(|t| &t.id == id)
        .ok_or_else(|| not_found(id))?;
    task.apply(patch);
    task.updated_at = now;
    Ok(task.clone())
}

pub(crate) fn remove(tasks: &mut Vec<Task>, id: &TaskId) -> TaskboardResult<()> {
    let pos = tasks
        .iter()
        .position(|t| &t.id == id)
        .ok_or_else(|| not_found(id))?;
    tasks.remove(pos);
    Ok(())
}
