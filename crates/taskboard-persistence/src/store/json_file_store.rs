use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use taskboard_core::{TaskboardError, TaskboardResult};
use taskboard_domain::{NewTask, Task, TaskId, TaskPatch, TaskQuery, TaskStore};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::atomic_writer::AtomicWriter;
use super::collection;
use crate::traits::{PersistenceMetadata, FORMAT_VERSION};

/// On-disk layout of a task file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDocument {
    pub version: u32,
    pub metadata: PersistenceMetadata,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl TaskDocument {
    pub fn empty(instance_id: Uuid) -> Self {
        Self {
            version: FORMAT_VERSION,
            metadata: PersistenceMetadata::new(instance_id),
            tasks: Vec::new(),
        }
    }
}

/// Task store backed by a single JSON file.
///
/// Every call re-reads the file, so edits from other processes are picked up
/// and the last writer wins. Calls made through one store instance are
/// serialized so each read-modify-write is atomic in-process.
#[derive(Debug)]
pub struct JsonFileTaskStore {
    path: PathBuf,
    instance_id: Uuid,
    lock: Mutex<()>,
}

impl JsonFileTaskStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_instance_id(path, Uuid::new_v4())
    }

    pub fn with_instance_id(path: impl AsRef<Path>, instance_id: Uuid) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            instance_id,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    pub async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }

    /// Read the document, treating a missing file as empty.
    pub async fn load(&self) -> TaskboardResult<TaskDocument> {
        let Some(bytes) = AtomicWriter::read_optional(&self.path).await? else {
            return Ok(TaskDocument::empty(self.instance_id));
        };

        let document: TaskDocument = serde_json::from_slice(&bytes)
            .map_err(|e| TaskboardError::Serialization(e.to_string()))?;

        if document.version != FORMAT_VERSION {
            return Err(TaskboardError::Serialization(format!(
                "Unsupported format version: {}",
                document.version
            )));
        }
        Ok(document)
    }

    async fn save(&self, mut document: TaskDocument) -> TaskboardResult<()> {
        document.metadata = PersistenceMetadata::new(self.instance_id);

        let bytes = serde_json::to_vec_pretty(&document)
            .map_err(|e| TaskboardError::Serialization(e.to_string()))?;
        let len = bytes.len();
        AtomicWriter::write_atomic(&self.path, bytes).await?;

        tracing::info!(
            "Saved {} tasks ({} bytes) to {}",
            document.tasks.len(),
            len,
            self.path.display()
        );
        Ok(())
    }
}

#[async_trait]
impl TaskStore for JsonFileTaskStore {
    async fn list(&self, query: &TaskQuery) -> TaskboardResult<Vec<Task>> {
        let _guard = self.lock.lock().await;
        let document = self.load().await?;
        Ok(query.run(&document.tasks))
    }

    async fn get(&self, id: &TaskId) -> TaskboardResult<Task> {
        let _guard = self.lock.lock().await;
        let document = self.load().await?;
        collection::get(&document.tasks, id)
    }

    async fn create(&self, task: NewTask) -> TaskboardResult<Task> {
        let _guard = self.lock.lock().await;
        let mut document = self.load().await?;
        let created = collection::insert(&mut document.tasks, task, Utc::now());
        self.save(document).await?;
        Ok(created)
    }

    async fn update(&self, id: &TaskId, patch: TaskPatch) -> TaskboardResult<Task> {
        let _guard = self.lock.lock().await;
        let mut document = self.load().await?;
        let updated = collection::update(&mut document.tasks, id, &patch, Utc::now())?;
        self.save(document).await?;
        Ok(updated)
    }

    async fn delete(&self, id: &TaskId) -> TaskboardResult<()> {
        let _guard = self.lock.lock().await;
        let mut document = self.load().await?;
        collection::remove(&mut document.tasks, id)?;
        self.save(document).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskboard_domain::TaskStatus;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_file_lists_empty() {
        let dir = tempdir().unwrap();
        let store = JsonFileTaskStore::new(dir.path().join("tasks.json"));

        assert!(!store.exists().await);
        assert!(store.list(&TaskQuery::all()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_changes_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tasks.json");

        let created = {
            let store = JsonFileTaskStore::new(&path);
            let created = store
                .create(NewTask::new("p-1", "w-1", "Renew card").with_status(TaskStatus::Ready))
                .await
                .unwrap();
            store
                .update(&created.id, TaskPatch::new().status(TaskStatus::Blocked).order(3))
                .await
                .unwrap();
            created
        };

        let reopened = JsonFileTaskStore::new(&path);
        let task = reopened.get(&created.id).await.unwrap();
        assert_eq!(task.status, TaskStatus::Blocked);
        assert_eq!(task.order, 3);
        assert_eq!(task.title, "Renew card");
    }

    #[tokio::test]
    async fn test_saved_document_carries_metadata() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let instance_id = Uuid::new_v4();
        let store = JsonFileTaskStore::with_instance_id(&path, instance_id);

        store.create(NewTask::new("p-1", "w-1", "A")).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["version"], 1);
        assert_eq!(raw["metadata"]["instance_id"], instance_id.to_string());
        assert_eq!(raw["tasks"][0]["status"], "backlog");
    }

    #[tokio::test]
    async fn test_unsupported_version_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let mut document = TaskDocument::empty(Uuid::new_v4());
        document.version = 7;
        std::fs::write(&path, serde_json::to_vec(&document).unwrap()).unwrap();

        let store = JsonFileTaskStore::new(&path);
        assert!(matches!(
            store.list(&TaskQuery::all()).await,
            Err(TaskboardError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_and_filter() {
        let dir = tempdir().unwrap();
        let store = JsonFileTaskStore::new(dir.path().join("tasks.json"));

        let keep = store
            .create(NewTask::new("p-1", "w-1", "Keep"))
            .await
            .unwrap();
        let removed = store
            .create(NewTask::new("p-2", "w-1", "Drop"))
            .await
            .unwrap();
        store.delete(&removed.id).await.unwrap();

        let remaining = store.list(&TaskQuery::all().workspace("w-1")).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, keep.id);
        assert!(store.delete(&removed.id).await.is_err());
    }
}
