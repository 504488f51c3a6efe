use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use taskboard_core::TaskboardError;
use uuid::Uuid;

use crate::patch::TaskPatch;

pub type ProjectId = String;
pub type WorkspaceId = String;

/// Opaque task identity assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The six board columns, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Backlog,
    Ready,
    InProgress,
    Review,
    Blocked,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 6] = [
        TaskStatus::Backlog,
        TaskStatus::Ready,
        TaskStatus::InProgress,
        TaskStatus::Review,
        TaskStatus::Blocked,
        TaskStatus::Done,
    ];

    /// Column index in display order.
    pub fn index(self) -> usize {
        match self {
            Self::Backlog => 0,
            Self::Ready => 1,
            Self::InProgress => 2,
            Self::Review => 3,
            Self::Blocked => 4,
            Self::Done => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Backlog => "backlog",
            Self::Ready => "ready",
            Self::InProgress => "in-progress",
            Self::Review => "review",
            Self::Blocked => "blocked",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = TaskboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| TaskboardError::Validation(format!("unknown status '{}'", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub project_id: ProjectId,
    pub workspace_id: WorkspaceId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_by: Option<String>,
    #[serde(default)]
    pub is_ceo_question: bool,
    #[serde(default)]
    pub assignees: Vec<String>,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Apply a partial update in place. Fields the patch leaves unset are
    /// untouched, including `updated_at`, which the store owns.
    pub fn apply(&mut self, patch: &TaskPatch) {
        patch.apply_to(self);
    }

    pub fn with_patch(&self, patch: &TaskPatch) -> Self {
        let mut task = self.clone();
        task.apply(patch);
        task
    }
}

/// Creation payload: a task without its store-assigned identity and
/// timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub project_id: ProjectId,
    pub workspace_id: WorkspaceId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_status")]
    pub status: TaskStatus,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub is_ceo_question: bool,
    #[serde(default)]
    pub assignees: Vec<String>,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

fn default_status() -> TaskStatus {
    TaskStatus::Backlog
}

impl NewTask {
    pub fn new(
        project_id: impl Into<ProjectId>,
        workspace_id: impl Into<WorkspaceId>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            workspace_id: workspace_id.into(),
            title: title.into(),
            description: None,
            status: default_status(),
            order: 0,
            is_ceo_question: false,
            assignees: Vec::new(),
            platforms: Vec::new(),
            due_date: None,
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn into_task(self, id: TaskId, now: DateTime<Utc>) -> Task {
        Task {
            id,
            project_id: self.project_id,
            workspace_id: self.workspace_id,
            title: self.title,
            description: self.description,
            status: self.status,
            order: self.order,
            is_completed: false,
            completed_at: None,
            completed_by: None,
            is_ceo_question: self.is_ceo_question,
            assignees: self.assignees,
            platforms: self.platforms,
            due_date: self.due_date,
            created_at: now,
            updated_at: now,
        }
    }
}
