use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{TaskboardError, TaskboardResult};

/// What a board session does with its optimistic change when the store
/// rejects the write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Restore the task as it was before the drag.
    #[default]
    Revert,
    /// Leave the optimistic state in place and only log the failure.
    Keep,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    /// Renumber source and destination columns to 0..n after each move.
    #[serde(default)]
    pub compact_orders: bool,
    #[serde(default)]
    pub default_actor: Option<String>,
}

impl BoardConfig {
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            dirs::home_dir().map(|home| home.join(".config/taskboard/config.toml"))
        }
        #[cfg(target_os = "linux")]
        {
            dirs::config_dir().map(|config| config.join("taskboard/config.toml"))
        }
        #[cfg(target_os = "windows")]
        {
            dirs::config_dir().map(|config| config.join("taskboard\\config.toml"))
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            None
        }
    }

    /// Load from the user config location, falling back to defaults when the
    /// file is missing or unreadable.
    pub fn load() -> Self {
        Self::load_or_default(Self::config_path().as_deref())
    }

    pub fn load_or_default(path: Option<&Path>) -> Self {
        match path {
            Some(path) if path.exists() => Self::load_from(path).unwrap_or_else(|e| {
                tracing::warn!("Ignoring config at {}: {}", path.display(), e);
                Self::default()
            }),
            _ => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> TaskboardResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> TaskboardResult<Self> {
        toml::from_str(content).map_err(|e| TaskboardError::Config(e.to_string()))
    }

    pub fn effective_actor<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.default_actor.as_deref().unwrap_or(fallback)
    }
}
