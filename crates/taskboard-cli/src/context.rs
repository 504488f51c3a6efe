use std::path::{Path, PathBuf};
use std::sync::Arc;
use taskboard_core::{BoardConfig, TaskboardError, TaskboardResult};
use taskboard_domain::{
    ActorContext, AdvisorySignal, Board, DragEnd, SignalEvent, Slot, Task, TaskId, TaskQuery,
    TaskStatus, TaskStore,
};
use taskboard_persistence::{BoardSession, DragOutcome, JsonFileTaskStore};

use crate::cli::Cli;

/// One project's board backed by a task file, loaded for a single command.
pub struct CliContext {
    pub project_id: String,
    pub workspace_id: String,
    store: Arc<JsonFileTaskStore>,
    session: BoardSession<JsonFileTaskStore>,
}

impl CliContext {
    pub async fn load(cli: &Cli, file_path: &Path) -> TaskboardResult<Self> {
        let config = match &cli.config {
            Some(path) => BoardConfig::load_from(path)?,
            None => BoardConfig::load(),
        };

        let fallback = std::env::var("USER").unwrap_or_else(|_| "anonymous".to_string());
        let actor_id = cli
            .actor
            .clone()
            .unwrap_or_else(|| config.effective_actor(&fallback).to_string());
        let actor = ActorContext::new(actor_id).in_workspace(cli.workspace.clone());

        let store = Arc::new(JsonFileTaskStore::new(file_path));
        let scope = TaskQuery::for_project(cli.project.clone()).workspace(cli.workspace.clone());
        let session = BoardSession::new(Arc::clone(&store), scope, actor)
            .with_config(config)
            .with_sink(Arc::new(|event: &SignalEvent| {
                tracing::info!(task_id = %event.task_id, "Signal: {}", event.signal);
            }));
        session.refresh().await?;

        Ok(Self {
            project_id: cli.project.clone(),
            workspace_id: cli.workspace.clone(),
            store,
            session,
        })
    }

    pub fn file_path(&self) -> PathBuf {
        self.store.path().to_path_buf()
    }

    pub fn session(&self) -> &BoardSession<JsonFileTaskStore> {
        &self.session
    }

    pub fn board(&self) -> Board {
        self.session.board()
    }

    /// Run a query against this board's project, bypassing the session's
    /// local list.
    pub async fn list(&self, query: TaskQuery) -> TaskboardResult<Vec<Task>> {
        let query = query
            .project(self.project_id.clone())
            .workspace(self.workspace_id.clone());
        self.store.list(&query).await
    }

    /// Drag `id` from wherever it currently sits to `column`, at `index` or
    /// the end of the column. Waits for the write to land.
    ///
    /// Without an index, a task already in `column` stays where it is.
    pub async fn move_task(
        &self,
        id: &TaskId,
        column: TaskStatus,
        index: Option<usize>,
    ) -> TaskboardResult<(Task, Vec<AdvisorySignal>)> {
        let board = self.board();
        let source = board.position_of(id).ok_or_else(|| {
            TaskboardError::NotFound(format!("Task {} not found in project {}", id, self.project_id))
        })?;
        let dest = match index {
            Some(index) => Slot::new(column, index),
            None if column == source.column => source,
            None => Slot::new(column, board.column(column).len()),
        };
        let drag = DragEnd::new(id.clone(), source, dest);

        match self.session.handle_drag(&drag)? {
            DragOutcome::NoOp => {
                let task = board.task_at(source).cloned().ok_or_else(|| {
                    TaskboardError::NotFound(format!("Task {} not found", id))
                })?;
                Ok((task, Vec::new()))
            }
            DragOutcome::Moved { signals, write, .. } => {
                let saved = write.wait().await?;
                Ok((saved, signals))
            }
        }
    }
}
