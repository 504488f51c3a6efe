use serde::{Deserialize, Serialize};

use crate::task::WorkspaceId;

/// Who is acting on the board, passed explicitly into every operation that
/// stamps or scopes data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    pub actor_id: String,
    #[serde(default)]
    pub workspace_id: Option<WorkspaceId>,
}

impl ActorContext {
    pub fn new(actor_id: impl Into<String>) -> Self {
        Self {
            actor_id: actor_id.into(),
            workspace_id: None,
        }
    }

    pub fn in_workspace(mut self, workspace_id: impl Into<WorkspaceId>) -> Self {
        self.workspace_id = Some(workspace_id.into());
        self
    }
}
