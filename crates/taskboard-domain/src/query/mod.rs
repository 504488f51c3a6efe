//! Task listing queries.
//!
//! Exact-match filters, a single sort key and an optional limit, mirroring
//! what a hosted entity store accepts. Stores that hold tasks in memory run
//! queries through [`TaskQuery::run`] so every backend filters and sorts
//! the same way.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use taskboard_core::TaskboardError;

use crate::task::{ProjectId, Task, TaskStatus, WorkspaceId};

/// Exact-match filter. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<WorkspaceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_ceo_question: Option<bool>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.project_id
            .as_ref()
            .map_or(true, |id| *id == task.project_id)
            && self
                .workspace_id
                .as_ref()
                .map_or(true, |id| *id == task.workspace_id)
            && self.status.map_or(true, |status| status == task.status)
            && self
                .is_ceo_question
                .map_or(true, |flag| flag == task.is_ceo_question)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Order,
    Title,
    CreatedAt,
    UpdatedAt,
    CompletedAt,
    DueDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Sort key in the `field` / `-field` string form used by entity stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSort {
    pub field: SortField,
    pub order: SortOrder,
}

impl TaskSort {
    pub fn ascending(field: SortField) -> Self {
        Self {
            field,
            order: SortOrder::Ascending,
        }
    }

    pub fn descending(field: SortField) -> Self {
        Self {
            field,
            order: SortOrder::Descending,
        }
    }

    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        let cmp = match self.field {
            SortField::Order => a.order.cmp(&b.order),
            SortField::Title => a.title.cmp(&b.title),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortField::CompletedAt => nones_last(a.completed_at, b.completed_at),
            SortField::DueDate => nones_last(a.due_date, b.due_date),
        };
        match self.order {
            SortOrder::Ascending => cmp,
            SortOrder::Descending => cmp.reverse(),
        }
    }

    /// Stable sort in place. Works with both `&Task` and `Task` elements.
    pub fn sort<T: Borrow<Task>>(&self, tasks: &mut [T]) {
        tasks.sort_by(|a, b| self.compare(a.borrow(), b.borrow()));
    }

    fn field_name(&self) -> &'static str {
        match self.field {
            SortField::Order => "order",
            SortField::Title => "title",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::CompletedAt => "completed_at",
            SortField::DueDate => "due_date",
        }
    }
}

fn nones_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl FromStr for TaskSort {
    type Err = TaskboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (order, name) = match s.strip_prefix('-') {
            Some(rest) => (SortOrder::Descending, rest),
            None => (SortOrder::Ascending, s),
        };
        let field = match name {
            "order" => SortField::Order,
            "title" => SortField::Title,
            "created_at" | "created_date" => SortField::CreatedAt,
            "updated_at" | "updated_date" => SortField::UpdatedAt,
            "completed_at" => SortField::CompletedAt,
            "due_date" => SortField::DueDate,
            other => {
                return Err(TaskboardError::Validation(format!(
                    "unknown sort field '{}'",
                    other
                )))
            }
        };
        Ok(Self { field, order })
    }
}

impl fmt::Display for TaskSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.order == SortOrder::Descending {
            f.write_str("-")?;
        }
        f.write_str(self.field_name())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub filter: TaskFilter,
    pub sort: Option<TaskSort>,
    pub limit: Option<usize>,
}

impl TaskQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_project(project_id: impl Into<ProjectId>) -> Self {
        Self::all().project(project_id)
    }

    pub fn project(mut self, project_id: impl Into<ProjectId>) -> Self {
        self.filter.project_id = Some(project_id.into());
        self
    }

    pub fn workspace(mut self, workspace_id: impl Into<WorkspaceId>) -> Self {
        self.filter.workspace_id = Some(workspace_id.into());
        self
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.filter.status = Some(status);
        self
    }

    pub fn ceo_questions(mut self, flag: bool) -> Self {
        self.filter.is_ceo_question = Some(flag);
        self
    }

    pub fn sorted(mut self, sort: TaskSort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Filter, sort, then truncate. Unsorted queries keep input order.
    pub fn run<'a>(&self, tasks: impl IntoIterator<Item = &'a Task>) -> Vec<Task> {
        let mut matched: Vec<&Task> = tasks
            .into_iter()
            .filter(|t| self.filter.matches(t))
            .collect();
        if let Some(sort) = &self.sort {
            sort.sort(&mut matched);
        }
        if let Some(limit) = self.limit {
            matched.truncate(limit);
        }
        matched.into_iter().cloned().collect()
    }
}
