use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskboardError {
    /// Rejected locally before any store call.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A store write failed after the optimistic update was applied.
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl TaskboardError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
