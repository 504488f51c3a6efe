pub mod board;
pub mod context;
pub mod drag;
pub mod field_update;
pub mod patch;
pub mod query;
pub mod side_effects;
pub mod signals;
pub mod store;
pub mod task;

pub use board::{Board, BoardSummary};
pub use context::ActorContext;
pub use drag::{Delta, DragEnd, DragReconciler, Reconciled, Slot};
pub use field_update::FieldUpdate;
pub use patch::TaskPatch;
pub use query::{SortField, SortOrder, TaskFilter, TaskQuery, TaskSort};
pub use side_effects::{
    AdvisorySignal, Mutation, SideEffectPolicy, SideEffects, Transition, TransitionRule,
};
pub use signals::{NoopSink, SignalEvent, SignalSink};
pub use store::TaskStore;
pub use task::{NewTask, ProjectId, Task, TaskId, TaskStatus, WorkspaceId};
