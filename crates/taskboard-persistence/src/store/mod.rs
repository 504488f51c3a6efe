pub mod atomic_writer;
mod collection;
pub mod json_file_store;
pub mod memory_store;

pub use atomic_writer::AtomicWriter;
pub use json_file_store::{JsonFileTaskStore, TaskDocument};
pub use memory_store::InMemoryTaskStore;
