//! Optimistic apply-and-persist for one board view.
//!
//! A [`BoardSession`] keeps the local task list for a scoped board, applies
//! drag results immediately, and pushes the patch to the store on a spawned
//! tokio task. The host never waits on the store before the next gesture.
//!
//! Writes are last-write-wins. After a write is acknowledged and no other
//! write from this session is still in flight, the local list is replaced by
//! a fresh `list` from the store, unless something newer happened locally
//! while the `list` was outstanding. A failed write puts back the last state
//! the store acknowledged for that task.

mod broadcast;

pub use broadcast::BroadcastSink;

use chrono::Utc;
use futures::future::join_all;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use taskboard_core::{BoardConfig, FailurePolicy, TaskboardError, TaskboardResult};
use taskboard_domain::{
    ActorContext, AdvisorySignal, Board, DragEnd, DragReconciler, NewTask, NoopSink, Reconciled,
    SideEffectPolicy, SignalEvent, SignalSink, Task, TaskId, TaskPatch, TaskQuery, TaskStore,
};
use tokio::task::JoinHandle;

#[derive(Debug, Default)]
struct SessionState {
    tasks: Vec<Task>,
    /// Last state of each task acknowledged by the store.
    confirmed: HashMap<TaskId, Task>,
    in_flight: usize,
    /// Bumped on every local change. A refetch started under an older
    /// generation is discarded.
    generation: u64,
}

impl SessionState {
    fn find(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    fn load(&mut self, tasks: Vec<Task>) {
        self.confirmed = tasks.iter().map(|t| (t.id.clone(), t.clone())).collect();
        self.tasks = tasks;
        self.generation += 1;
    }

    fn confirm(&mut self, task: &Task) {
        self.confirmed.insert(task.id.clone(), task.clone());
    }

    fn replace(&mut self, task: &Task) {
        if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == task.id) {
            *slot = task.clone();
        }
    }

    /// Put back the last acknowledged state, but only if nothing newer has
    /// touched the task since this write's optimistic apply.
    fn revert(&mut self, write: &PlannedWrite) -> bool {
        let restored = self
            .confirmed
            .get(&write.before.id)
            .cloned()
            .unwrap_or_else(|| write.before.clone());
        match self.tasks.iter_mut().find(|t| t.id == write.before.id) {
            Some(slot) if *slot == write.after => {
                *slot = restored;
                self.generation += 1;
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
struct PlannedWrite {
    before: Task,
    after: Task,
    patch: TaskPatch,
}

impl PlannedWrite {
    fn new(before: Task, patch: TaskPatch) -> Self {
        let after = before.with_patch(&patch);
        Self {
            before,
            after,
            patch,
        }
    }
}

/// Handle to a spawned store write. Await it to observe the outcome, or
/// drop it to let the write finish in the background.
#[derive(Debug)]
pub struct PendingWrite {
    task_id: TaskId,
    handle: JoinHandle<TaskboardResult<Task>>,
}

impl PendingWrite {
    pub fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    /// The task as acknowledged by the store, or the persistence failure.
    pub async fn wait(self) -> TaskboardResult<Task> {
        self.handle
            .await
            .map_err(|e| TaskboardError::Persistence(format!("write task aborted: {}", e)))?
    }

    pub async fn wait_all(writes: Vec<PendingWrite>) -> Vec<TaskboardResult<Task>> {
        join_all(writes.into_iter().map(PendingWrite::wait)).await
    }
}

#[derive(Debug)]
pub enum DragOutcome {
    /// Released at its origin. Nothing was applied or sent.
    NoOp,
    Moved {
        /// Local state of the task right after the optimistic apply.
        task: Task,
        signals: Vec<AdvisorySignal>,
        write: PendingWrite,
    },
}

pub struct BoardSession<S: TaskStore + 'static> {
    store: Arc<S>,
    scope: TaskQuery,
    actor: ActorContext,
    policy: SideEffectPolicy,
    config: BoardConfig,
    sink: Arc<dyn SignalSink>,
    state: Arc<Mutex<SessionState>>,
}

impl<S: TaskStore + 'static> BoardSession<S> {
    /// `scope` selects the tasks this board shows, typically one project.
    pub fn new(store: Arc<S>, scope: TaskQuery, actor: ActorContext) -> Self {
        Self {
            store,
            scope,
            actor,
            policy: SideEffectPolicy::standard(),
            config: BoardConfig::default(),
            sink: Arc::new(NoopSink),
            state: Arc::new(Mutex::new(SessionState::default())),
        }
    }

    pub fn with_config(mut self, config: BoardConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_policy(mut self, policy: SideEffectPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn SignalSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn actor(&self) -> &ActorContext {
        &self.actor
    }

    pub fn scope(&self) -> &TaskQuery {
        &self.scope
    }

    /// Replace the local list with the store's current view of the scope.
    pub async fn refresh(&self) -> TaskboardResult<()> {
        let tasks = self.store.list(&self.scope).await?;
        tracing::debug!("Loaded {} tasks into board session", tasks.len());
        self.state.lock().load(tasks);
        Ok(())
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.state.lock().tasks.clone()
    }

    pub fn board(&self) -> Board {
        Board::partition(&self.state.lock().tasks)
    }

    pub fn in_flight(&self) -> usize {
        self.state.lock().in_flight
    }

    /// Reconcile a drag against the local board, apply it, and start the
    /// store write. Must be called from within a tokio runtime.
    ///
    /// Invalid drags are rejected with `Validation` before anything changes.
    pub fn handle_drag(&self, drag: &DragEnd) -> TaskboardResult<DragOutcome> {
        let now = Utc::now();

        let (writes, signals) = {
            let mut state = self.state.lock();
            let board = Board::partition(&state.tasks);

            let (before, reconciled) =
                DragReconciler::reconcile_on(&board, drag).inspect_err(|e| {
                    tracing::warn!(task_id = %drag.task_id, "Rejected drag: {}", e);
                })?;
            let delta = match reconciled {
                Reconciled::NoOp => return Ok(DragOutcome::NoOp),
                Reconciled::Move(delta) => delta,
            };

            let (mut patch, signals) = self.policy.augment(before.status, delta, &self.actor, now);

            let mut siblings = Vec::new();
            if self.config.compact_orders {
                for (id, order) in board.renumber_for_move(&drag.task_id, drag.dest) {
                    if id == drag.task_id {
                        patch.order = Some(order);
                    } else if let Some(sibling) = board.find(&id).filter(|t| t.order != order) {
                        siblings.push(PlannedWrite::new(
                            sibling.clone(),
                            TaskPatch::new().order(order),
                        ));
                    }
                }
            }

            let mut writes = vec![PlannedWrite::new(before.clone(), patch)];
            writes.extend(siblings);
            for write in &writes {
                state.replace(&write.after);
            }
            (writes, signals)
        };

        let task = writes[0].after.clone();
        self.emit(&task.id, &signals);

        Ok(DragOutcome::Moved {
            task,
            signals,
            write: self.dispatch(writes),
        })
    }

    /// Toggle the CEO-question flag. Returns `None` when it already has the
    /// requested value.
    pub fn set_ceo_question(
        &self,
        id: &TaskId,
        flag: bool,
    ) -> TaskboardResult<Option<PendingWrite>> {
        let write = {
            let mut state = self.state.lock();
            let task = state.find(id).ok_or_else(|| unknown_task(id))?;
            if task.is_ceo_question == flag {
                return Ok(None);
            }
            let write = PlannedWrite::new(task.clone(), TaskPatch::new().ceo_question(flag));
            state.replace(&write.after);
            write
        };
        Ok(Some(self.dispatch(vec![write])))
    }

    /// Create through the store and add the result locally if it falls in
    /// this board's scope.
    pub async fn create_task(&self, task: NewTask) -> TaskboardResult<Task> {
        let created = self.store.create(task).await?;
        if self.scope.filter.matches(&created) {
            let mut state = self.state.lock();
            state.confirm(&created);
            state.tasks.push(created.clone());
            state.generation += 1;
        }
        tracing::info!(task_id = %created.id, "Created task in '{}'", created.status);
        Ok(created)
    }

    /// Remove locally, then delete in the store. On failure the task is put
    /// back unless the failure policy says to keep local state.
    pub async fn delete_task(&self, id: &TaskId) -> TaskboardResult<()> {
        let (index, removed) = {
            let mut state = self.state.lock();
            let index = state
                .tasks
                .iter()
                .position(|t| &t.id == id)
                .ok_or_else(|| unknown_task(id))?;
            state.generation += 1;
            (index, state.tasks.remove(index))
        };

        if let Err(e) = self.store.delete(id).await {
            tracing::error!(task_id = %id, "Failed to delete task: {}", e);
            if self.config.failure_policy == FailurePolicy::Revert {
                let mut state = self.state.lock();
                let index = index.min(state.tasks.len());
                state.tasks.insert(index, removed);
                state.generation += 1;
            }
            return Err(TaskboardError::Persistence(e.to_string()));
        }
        self.state.lock().confirmed.remove(id);
        Ok(())
    }

    fn emit(&self, task_id: &TaskId, signals: &[AdvisorySignal]) {
        for &signal in signals {
            tracing::debug!(task_id = %task_id, "Emitting {} signal", signal);
            self.sink.notify(&SignalEvent {
                signal,
                task_id: task_id.clone(),
            });
        }
    }

    fn dispatch(&self, writes: Vec<PlannedWrite>) -> PendingWrite {
        let task_id = writes[0].before.id.clone();
        {
            let mut state = self.state.lock();
            state.in_flight += 1;
            state.generation += 1;
        }

        let store = Arc::clone(&self.store);
        let state = Arc::clone(&self.state);
        let scope = self.scope.clone();
        let failure_policy = self.config.failure_policy;

        let handle = tokio::spawn(persist(store, state, scope, failure_policy, writes));
        PendingWrite { task_id, handle }
    }
}

fn unknown_task(id: &TaskId) -> TaskboardError {
    TaskboardError::Validation(format!("task {} is not on this board", id))
}

/// Send each planned write in order. The first is the dragged task; the rest
/// are compaction renumbers. Stops at the first failure.
///
/// Resolves to the dragged task as saved. A failed renumber after a saved
/// move is logged and reverted per policy but does not fail the move.
async fn persist<S: TaskStore + ?Sized>(
    store: Arc<S>,
    state: Arc<Mutex<SessionState>>,
    scope: TaskQuery,
    failure_policy: FailurePolicy,
    writes: Vec<PlannedWrite>,
) -> TaskboardResult<Task> {
    let mut acknowledged = None;
    let mut failure = None;

    for (i, write) in writes.iter().enumerate() {
        match store.update(&write.before.id, write.patch.clone()).await {
            Ok(saved) => {
                tracing::info!(task_id = %saved.id, "Persisted task update");
                state.lock().confirm(&saved);
                if i == 0 {
                    acknowledged = Some(saved);
                }
            }
            Err(e) => {
                tracing::error!(task_id = %write.before.id, "Failed to persist task update: {}", e);
                failure = Some((i, e));
                break;
            }
        }
    }

    let (remaining, generation) = {
        let mut state = state.lock();
        state.in_flight -= 1;
        if let Some((failed_at, _)) = &failure {
            match failure_policy {
                FailurePolicy::Revert => {
                    for write in &writes[*failed_at..] {
                        if !state.revert(write) {
                            tracing::debug!(
                                task_id = %write.before.id,
                                "Task changed since the failed write; not reverting"
                            );
                        }
                    }
                }
                FailurePolicy::Keep => {
                    tracing::warn!("Keeping optimistic state after failed write");
                }
            }
        }
        (state.in_flight, state.generation)
    };

    let saved = match (acknowledged, failure) {
        (Some(saved), None) => saved,
        (Some(saved), Some((failed_at, e))) => {
            tracing::warn!(
                task_id = %saved.id,
                "Move saved but {} sibling renumber(s) were not: {}",
                writes.len() - failed_at,
                e
            );
            return Ok(saved);
        }
        (None, Some((_, e))) => return Err(TaskboardError::Persistence(e.to_string())),
        (None, None) => {
            return Err(TaskboardError::Persistence(
                "no write was dispatched".to_string(),
            ))
        }
    };

    if remaining == 0 {
        refetch(&*store, &state, &scope, generation).await;
    }
    Ok(saved)
}

/// Replace the local list with the store's view, unless the session has
/// changed since `generation` was read.
async fn refetch<S: TaskStore + ?Sized>(
    store: &S,
    state: &Mutex<SessionState>,
    scope: &TaskQuery,
    generation: u64,
) {
    match store.list(scope).await {
        Ok(tasks) => {
            let mut state = state.lock();
            if state.in_flight == 0 && state.generation == generation {
                state.load(tasks);
            } else {
                tracing::debug!("Discarding refetch superseded by newer changes");
            }
        }
        Err(e) => tracing::warn!("Refetch after write failed: {}", e),
    }
}
