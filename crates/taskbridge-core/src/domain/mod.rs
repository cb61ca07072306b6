//! Domain entities and value types
//!
//! Pure business data with no I/O. The mapping record ([`SyncedItem`]) is the
//! engine's source of truth for "already handled"; the task types are
//! port-level representations of items living in the two external stores.

pub mod errors;
pub mod mapping;
pub mod newtypes;
pub mod outcome;
pub mod task;

pub use errors::DomainError;
pub use mapping::{MappingPatch, SyncedItem};
pub use newtypes::{LocalId, RemoteItemId, RemoteListId};
pub use outcome::PushOutcome;
pub use task::{
    IncomingTask, LocalTask, NewLocalTask, NewRemoteTask, RemoteList, RemoteTask,
    RemoteTaskPatch, TaskStatus,
};

/// List name used when a local item carries no container name.
pub const DEFAULT_LIST_NAME: &str = "Reminders";
