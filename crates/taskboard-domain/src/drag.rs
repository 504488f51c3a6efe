//! Drag-end reconciliation.
//!
//! Turns a drag gesture, expressed as source and destination slots, into the
//! minimal status/order delta for the dragged task. Sibling tasks are never
//! renumbered here; ties are left to the stable sort in [`Board`].

use serde::{Deserialize, Serialize};
use taskboard_core::{TaskboardError, TaskboardResult};

use crate::board::Board;
use crate::patch::TaskPatch;
use crate::task::{Task, TaskId, TaskStatus};

/// A (column, index) coordinate on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub column: TaskStatus,
    pub index: usize,
}

impl Slot {
    pub fn new(column: TaskStatus, index: usize) -> Self {
        Self { column, index }
    }

    /// Build a slot from host-supplied strings, rejecting unknown statuses.
    pub fn parse(column: &str, index: usize) -> TaskboardResult<Self> {
        Ok(Self::new(column.parse()?, index))
    }
}

/// What a host forwards when the user releases a dragged task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragEnd {
    pub task_id: TaskId,
    pub source: Slot,
    pub dest: Slot,
}

impl DragEnd {
    pub fn new(task_id: impl Into<TaskId>, source: Slot, dest: Slot) -> Self {
        Self {
            task_id: task_id.into(),
            source,
            dest,
        }
    }

    pub fn is_in_place(&self) -> bool {
        self.source == self.dest
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delta {
    pub status: TaskStatus,
    pub order: i32,
}

impl Delta {
    pub fn into_patch(self) -> TaskPatch {
        TaskPatch::new().status(self.status).order(self.order)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    /// Released where it started; nothing to apply or persist.
    NoOp,
    Move(Delta),
}

pub struct DragReconciler;

impl DragReconciler {
    /// Compute the delta for moving `task` from `source` to `dest`.
    pub fn reconcile(task: &Task, source: Slot, dest: Slot) -> TaskboardResult<Reconciled> {
        if task.status != source.column {
            return Err(TaskboardError::Validation(format!(
                "task {} is in '{}' but the drag started in '{}'",
                task.id, task.status, source.column
            )));
        }

        if source == dest {
            return Ok(Reconciled::NoOp);
        }

        let order = i32::try_from(dest.index).map_err(|_| {
            TaskboardError::Validation(format!("destination index {} out of range", dest.index))
        })?;

        Ok(Reconciled::Move(Delta {
            status: dest.column,
            order,
        }))
    }

    /// Resolve the dragged task against the current board and reconcile.
    ///
    /// Rejects unknown task ids and destination indexes past the end of the
    /// destination column. Returns the task as it was before the move.
    pub fn reconcile_on<'a>(
        board: &'a Board,
        drag: &DragEnd,
    ) -> TaskboardResult<(&'a Task, Reconciled)> {
        let task = board.find(&drag.task_id).ok_or_else(|| {
            TaskboardError::Validation(format!("task {} is not on this board", drag.task_id))
        })?;

        let dest_len = board.column(drag.dest.column).len();
        if drag.dest.index > dest_len {
            return Err(TaskboardError::Validation(format!(
                "destination index {} is past the end of '{}' ({} tasks)",
                drag.dest.index, drag.dest.column, dest_len
            )));
        }

        let reconciled = Self::reconcile(task, drag.source, drag.dest)?;
        tracing::debug!(
            task_id = %drag.task_id,
            from = %drag.source.column,
            to = %drag.dest.column,
            "Reconciled drag: {:?}",
            reconciled
        );
        Ok((task, reconciled))
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

    #[test]
    fn test_release_at_origin_is_noop() {
        let t = task("a", TaskStatus::Review, 2);
        let slot = Slot::new(TaskStatus::Review, 2);
        assert_eq!(
            DragReconciler::reconcile(&t, slot, slot).unwrap(),
            Reconciled::NoOp
        );
    }

    #[test]
    fn test_cross_column_move() {
        let t = task("t", TaskStatus::Ready, 2);
        let result = DragReconciler::reconcile(
            &t,
            Slot::new(TaskStatus::Ready, 2),
            Slot::new(TaskStatus::InProgress, 0),
        )
        .unwrap();
        assert_eq!(
            result,
            Reconciled::Move(Delta {
                status: TaskStatus::InProgress,
                order: 0
            })
        );
    }

    #[test]
    fn test_reorder_within_column() {
        let t = task("t", TaskStatus::Backlog, 0);
        let result = DragReconciler::reconcile(
            &t,
            Slot::new(TaskStatus::Backlog, 0),
            Slot::new(TaskStatus::Backlog, 3),
        )
        .unwrap();
        assert_eq!(
            result,
            Reconciled::Move(Delta {
                status: TaskStatus::Backlog,
                order: 3
            })
        );
    }

    #[test]
    fn test_source_mismatch_rejected() {
        let t = task("t", TaskStatus::Done, 0);
        let err = DragReconciler::reconcile(
            &t,
            Slot::new(TaskStatus::Ready, 0),
            Slot::new(TaskStatus::Review, 0),
        )
        .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_unknown_task_rejected() {
        let board = Board::partition(&[task("a", TaskStatus::Backlog, 0)]);
        let drag = DragEnd::new(
            "ghost",
            Slot::new(TaskStatus::Backlog, 0),
            Slot::new(TaskStatus::Done, 0),
        );
        assert!(DragReconciler::reconcile_on(&board, &drag)
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_destination_past_end_rejected() {
        let board = Board::partition(&[task("a", TaskStatus::Backlog, 0)]);
        let drag = DragEnd::new(
            "a",
            Slot::new(TaskStatus::Backlog, 0),
            Slot::new(TaskStatus::Done, 1),
        );
        assert!(DragReconciler::reconcile_on(&board, &drag).is_err());

        let append = DragEnd::new(
            "a",
            Slot::new(TaskStatus::Backlog, 0),
            Slot::new(TaskStatus::Done, 0),
        );
        let (before, result) = DragReconciler::reconcile_on(&board, &append).unwrap();
        assert_eq!(before.status, TaskStatus::Backlog);
        assert!(matches!(result, Reconciled::Move(_)));
    }

    #[test]
    fn test_slot_parse_rejects_unknown_status() {
        assert!(Slot::parse("archived", 0).unwrap_err().is_validation());
        assert_eq!(
            Slot::parse("in-progress", 1).unwrap(),
            Slot::new(TaskStatus::InProgress, 1)
        );
    }

    #[test]
    fn test_delta_patch() {
        let patch = Delta {
            status: TaskStatus::Blocked,
            order: 7,
        }
        .into_patch();
        assert_eq!(patch.status, Some(TaskStatus::Blocked));
        assert_eq!(patch.order, Some(7));
        assert!(patch.is_completed.is_none());
    }
}
