use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::field_update::FieldUpdate;
use crate::task::{Task, TaskStatus};

/// Partial update sent to the store. Unset fields are left unchanged and are
/// omitted when serialized, so a plain move is exactly `{"status", "order"}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "FieldUpdate::is_no_change")]
    pub description: FieldUpdate<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
    #[serde(default, skip_serializing_if = "FieldUpdate::is_no_change")]
    pub completed_at: FieldUpdate<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "FieldUpdate::is_no_change")]
    pub completed_by: FieldUpdate<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_ceo_question: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignees: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platforms: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "FieldUpdate::is_no_change")]
    pub due_date: FieldUpdate<DateTime<Utc>>,
}

impl TaskPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    pub fn ceo_question(mut self, flag: bool) -> Self {
        self.is_ceo_question = Some(flag);
        self
    }

    pub fn completion(mut self, at: DateTime<Utc>, by: impl Into<String>) -> Self {
        self.is_completed = Some(true);
        self.completed_at = FieldUpdate::Set(at);
        self.completed_by = FieldUpdate::Set(by.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Fields set in `other` override this patch.
    pub fn merge(self, other: TaskPatch) -> TaskPatch {
        TaskPatch {
            title: other.title.or(self.title),
            description: other.description.or(self.description),
            status: other.status.or(self.status),
            order: other.order.or(self.order),
            is_completed: other.is_completed.or(self.is_completed),
            completed_at: other.completed_at.or(self.completed_at),
            completed_by: other.completed_by.or(self.completed_by),
            is_ceo_question: other.is_ceo_question.or(self.is_ceo_question),
            assignees: other.assignees.or(self.assignees),
            platforms: other.platforms.or(self.platforms),
            due_date: other.due_date.or(self.due_date),
        }
    }

    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        self.description.apply_cloned(&mut task.description);
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(order) = self.order {
            task.order = order;
        }
        if let Some(is_completed) = self.is_completed {
            task.is_completed = is_completed;
        }
        self.completed_at.apply_cloned(&mut task.completed_at);
        self.completed_by.apply_cloned(&mut task.completed_by);
        if let Some(flag) = self.is_ceo_question {
            task.is_ceo_question = flag;
        }
        if let Some(assignees) = &self.assignees {
            task.assignees = assignees.clone();
        }
        if let Some(platforms) = &self.platforms {
            task.platforms = platforms.clone();
        }
        self.due_date.apply_cloned(&mut task.due_date);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{NewTask, TaskId};
    use serde_json::json;

    fn sample_task() -> Task {
        let mut new_task = NewTask::new("p-1", "w-1", "Quarterly close");
        new_task.assignees = vec!["alice".into()];
        new_task.description = Some("Reconcile cards".into());
        new_task.into_task(TaskId::new("t-1"), Utc::now())
    }

    #[test]
    fn test_move_patch_serializes_only_status_and_order() {
        let patch = TaskPatch::new().status(TaskStatus::InProgress).order(0);
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value, json!({ "status": "in-progress", "order": 0 }));
    }

    #[test]
    fn test_empty_patch() {
        assert!(TaskPatch::new().is_empty());
        assert!(!TaskPatch::new().order(1).is_empty());
        assert_eq!(serde_json::to_value(TaskPatch::new()).unwrap(), json!({}));
    }

    #[test]
    fn test_apply_leaves_unset_fields() {
        let mut task = sample_task();
        let before = task.clone();

        task.apply(&TaskPatch::new().status(TaskStatus::Review).order(4));

        assert_eq!(task.status, TaskStatus::Review);
        assert_eq!(task.order, 4);
        assert_eq!(task.title, before.title);
        assert_eq!(task.description, before.description);
        assert_eq!(task.assignees, before.assignees);
        assert_eq!(task.updated_at, before.updated_at);
    }

    #[test]
    fn test_clear_nullable_field() {
        let mut task = sample_task();
        let patch = TaskPatch {
            description: FieldUpdate::Clear,
            ..TaskPatch::default()
        };
        task.apply(&patch);
        assert_eq!(task.description, None);
    }

    #[test]
    fn test_merge_prefers_later_fields() {
        let now = Utc::now();
        let merged = TaskPatch::new()
            .status(TaskStatus::Done)
            .order(2)
            .merge(TaskPatch::new().completion(now, "bob").order(5));

        assert_eq!(merged.status, Some(TaskStatus::Done));
        assert_eq!(merged.order, Some(5));
        assert_eq!(merged.is_completed, Some(true));
        assert_eq!(merged.completed_at, FieldUpdate::Set(now));
        assert_eq!(merged.completed_by, FieldUpdate::Set("bob".to_string()));
    }

    #[test]
    fn test_deserialize_partial_patch() {
        let patch: TaskPatch =
            serde_json::from_value(json!({ "is_ceo_question": true, "due_date": null })).unwrap();
        assert_eq!(patch.is_ceo_question, Some(true));
        assert_eq!(patch.due_date, FieldUpdate::Clear);
        assert!(patch.status.is_none());
    }
}
