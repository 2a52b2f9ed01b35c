//! Filter criteria and compatibility preferences.
//!
//! - `types.rs` - Criteria, partial updates, preference vector, change events
//! - `store.rs` - In-memory criteria with persisted preferences
//! - `storage.rs` - Durable key-value backends

mod storage;
mod store;
mod types;

pub use storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, StorageError};
pub use store::{CriteriaStore, PREFERENCES_KEY};
pub use types::{
    CriteriaChange, FilterCriteria, FilterUpdate, PreferenceVector, ProjectStage, Propagation,
};
