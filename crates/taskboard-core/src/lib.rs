pub mod config;
pub mod error;
pub mod result;

pub use config::{BoardConfig, FailurePolicy};
pub use error::TaskboardError;
pub use result::TaskboardResult;
