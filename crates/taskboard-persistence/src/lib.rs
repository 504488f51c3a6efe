pub mod session;
pub mod store;
pub mod traits;

pub use session::{BoardSession, BroadcastSink, DragOutcome, PendingWrite};
pub use store::{InMemoryTaskStore, JsonFileTaskStore, TaskDocument};
pub use traits::PersistenceMetadata;
