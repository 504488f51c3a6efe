//! Read-only partition of a task set into the six status columns.

use serde::Serialize;

use crate::drag::Slot;
use crate::task::{Task, TaskId, TaskStatus};

/// Tasks grouped by status, each column stable-sorted ascending by `order`.
///
/// Built fresh from a task list; never mutated in place. Moves go through
/// [`crate::DragReconciler`] and the result is re-partitioned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Board {
    columns: [Vec<Task>; 6],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardSummary {
    pub columns: Vec<(TaskStatus, usize)>,
    pub total: usize,
    pub completed: usize,
    pub ceo_questions: usize,
}

impl Board {
    pub fn partition(tasks: &[Task]) -> Self {
        Self::from_tasks(tasks.iter().cloned())
    }

    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut board = Self::default();
        for task in tasks {
            board.columns[task.status.index()].push(task);
        }
        // sort_by_key is stable: equal orders keep input order
        for column in board.columns.iter_mut() {
            column.sort_by_key(|t| t.order);
        }
        board
    }

    pub fn column(&self, status: TaskStatus) -> &[Task] {
        &self.columns[status.index()]
    }

    /// Columns in display order.
    pub fn columns(&self) -> impl Iterator<Item = (TaskStatus, &[Task])> {
        TaskStatus::ALL
            .into_iter()
            .map(move |status| (status, self.column(status)))
    }

    pub fn len(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn find(&self, id: &TaskId) -> Option<&Task> {
        self.columns.iter().flatten().find(|t| &t.id == id)
    }

    pub fn position_of(&self, id: &TaskId) -> Option<Slot> {
        self.columns().find_map(|(status, tasks)| {
            tasks
                .iter()
                .position(|t| &t.id == id)
                .map(|index| Slot::new(status, index))
        })
    }

    pub fn task_at(&self, slot: Slot) -> Option<&Task> {
        self.column(slot.column).get(slot.index)
    }

    pub fn summary(&self) -> BoardSummary {
        let all = || self.columns.iter().flatten();
        BoardSummary {
            columns: self
                .columns()
                .map(|(status, tasks)| (status, tasks.len()))
                .collect(),
            total: self.len(),
            completed: all().filter(|t| t.is_completed).count(),
            ceo_questions: all().filter(|t| t.is_ceo_question).count(),
        }
    }

    /// Full `0..n` renumbering of the columns touched by moving `task_id` to
    /// `dest`, with the moved task inserted at `dest.index` (clamped to the
    /// column end). Returns an empty list for an unknown task.
    pub fn renumber_for_move(&self, task_id: &TaskId, dest: Slot) -> Vec<(TaskId, i32)> {
        let Some(source) = self.position_of(task_id) else {
            return Vec::new();
        };

        let mut renumbered = Vec::new();

        if source.column != dest.column {
            let remaining = self.column(source.column).iter().filter(|t| &t.id != task_id);
            renumbered.extend(remaining.enumerate().map(|(i, t)| (t.id.clone(), i as i32)));
        }

        let mut dest_ids: Vec<&TaskId> = self
            .column(dest.column)
            .iter()
            .map(|t| &t.id)
            .filter(|id| *id != task_id)
            .collect();
        let insert_at = dest.index.min(dest_ids.len());
        dest_ids.insert(insert_at, task_id);
        renumbered.extend(
            dest_ids
                .into_iter()
                .enumerate()
                .map(|(i, id)| (id.clone(), i as i32)),
        );

        renumbered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::NewTask;
    use chrono::Utc;

    fn task(id: &str, status: TaskStatus, order: i32) -> Task {
        NewTask::new("p-1", "w-1", format!("Task {}", id))
            .with_status(status)
            .with_order(order)
            .into_task(TaskId::new(id), Utc::now())
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_partition_is_complete() {
        let tasks = vec![
            task("a", TaskStatus::Backlog, 0),
            task("b", TaskStatus::Done, 0),
            task("c", TaskStatus::Blocked, 3),
            task("d", TaskStatus::Backlog, 1),
            task("e", TaskStatus::Review, 0),
            task("f", TaskStatus::InProgress, 2),
            task("g", TaskStatus::Ready, 9),
        ];
        let board = Board::partition(&tasks);

        let total: usize = board.columns().map(|(_, col)| col.len()).sum();
        assert_eq!(total, tasks.len());
        assert_eq!(board.len(), tasks.len());
        for t in &tasks {
            let hits = board
                .columns()
                .filter(|(_, col)| col.iter().any(|c| c.id == t.id))
                .count();
            assert_eq!(hits, 1, "task {} must be in exactly one column", t.id);
            assert_eq!(board.position_of(&t.id).unwrap().column, t.status);
        }
    }

    #[test]
    fn test_columns_sorted_by_order() {
        let tasks = vec![
            task("c", TaskStatus::Ready, 2),
            task("a", TaskStatus::Ready, 0),
            task("b", TaskStatus::Ready, 1),
        ];
        let board = Board::partition(&tasks);
        assert_eq!(ids(board.column(TaskStatus::Ready)), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_equal_orders_keep_input_order() {
        let tasks = vec![
            task("x", TaskStatus::Review, 1),
            task("y", TaskStatus::Review, 0),
            task("z", TaskStatus::Review, 1),
            task("w", TaskStatus::Review, 0),
        ];
        let board = Board::partition(&tasks);
        assert_eq!(ids(board.column(TaskStatus::Review)), vec!["y", "w", "x", "z"]);
    }

    #[test]
    fn test_columns_iterate_in_display_order() {
        let board = Board::partition(&[]);
        let statuses: Vec<_> = board.columns().map(|(s, _)| s).collect();
        assert_eq!(statuses, TaskStatus::ALL.to_vec());
        assert!(board.is_empty());
    }

    #[test]
    fn test_lookup_helpers() {
        let tasks = vec![
            task("a", TaskStatus::Done, 5),
            task("b", TaskStatus::Done, 1),
        ];
        let board = Board::partition(&tasks);

        let slot = board.position_of(&TaskId::new("a")).unwrap();
        assert_eq!(slot, Slot::new(TaskStatus::Done, 1));
        assert_eq!(board.task_at(slot).unwrap().id.as_str(), "a");
        assert!(board.find(&TaskId::new("missing")).is_none());
        assert!(board.position_of(&TaskId::new("missing")).is_none());
    }

    #[test]
    fn test_summary_counts() {
        let mut done = task("a", TaskStatus::Done, 0);
        done.is_completed = true;
        let mut escalated = task("b", TaskStatus::Blocked, 0);
        escalated.is_ceo_question = true;
        let board = Board::partition(&[done, escalated, task("c", TaskStatus::Backlog, 0)]);

        let summary = board.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.ceo_questions, 1);
        assert_eq!(summary.columns[TaskStatus::Blocked.index()], (TaskStatus::Blocked, 1));
    }

    #[test]
    fn test_renumber_across_columns() {
        let tasks = vec![
            task("a", TaskStatus::Backlog, 0),
            task("b", TaskStatus::Backlog, 4),
            task("c", TaskStatus::Backlog, 9),
            task("x", TaskStatus::Ready, 3),
            task("y", TaskStatus::Ready, 7),
        ];
        let board = Board::partition(&tasks);

        let plan = board.renumber_for_move(&TaskId::new("b"), Slot::new(TaskStatus::Ready, 1));
        let plan: Vec<(&str, i32)> = plan.iter().map(|(id, o)| (id.as_str(), *o)).collect();
        assert_eq!(
            plan,
            vec![("a", 0), ("c", 1), ("x", 0), ("b", 1), ("y", 2)]
        );
    }

    #[test]
    fn test_renumber_within_column_clamps_index() {
        let tasks = vec![
            task("a", TaskStatus::Ready, 0),
            task("b", TaskStatus::Ready, 1),
            task("c", TaskStatus::Ready, 2),
        ];
        let board = Board::partition(&tasks);

        let plan = board.renumber_for_move(&TaskId::new("a"), Slot::new(TaskStatus::Ready, 3));
        let plan: Vec<(&str, i32)> = plan.iter().map(|(id, o)| (id.as_str(), *o)).collect();
        assert_eq!(plan, vec![("b", 0), ("c", 1), ("a", 2)]);
    }

    #[test]
    fn test_renumber_unknown_task_is_empty() {
        let board = Board::partition(&[task("a", TaskStatus::Ready, 0)]);
        assert!(board
            .renumber_for_move(&TaskId::new("nope"), Slot::new(TaskStatus::Done, 0))
            .is_empty());
    }
}
