//! Mapping store port (driven/secondary port)
//!
//! Persistence for [`SyncedItem`] mapping records. Pure data access, no
//! policy: the engine consults and updates this store on every decision in
//! both sync directions.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because storage errors are adapter-specific
//!   (SQLite, filesystem, etc.) and don't need domain-level classification.
//! - No transactional multi-record guarantee is required; each record is
//!   independently consistent.
//! - Reads must reflect the latest successful write from the same or an
//!   earlier pass. Implementations must not cache completion state in a way
//!   that could serve stale values across passes.

use crate::domain::{LocalId, MappingPatch, SyncedItem};

/// Port trait for persistent mapping storage
///
/// ## Implementation Notes
///
/// - `put` is an upsert keyed by `local_id`; a conflicting record is
///   overwritten.
/// - `patch` must fail loudly (return an error) when the target record does
///   not exist; callers are required to have fetched first.
#[async_trait::async_trait]
pub trait IMappingStore: Send + Sync {
    /// Retrieves a mapping record by local id
    async fn get(&self, local_id: &LocalId) -> anyhow::Result<Option<SyncedItem>>;

    /// Retrieves all mapping records, ordered by creation time (oldest first)
    async fn get_all(&self) -> anyhow::Result<Vec<SyncedItem>>;

    /// Saves a mapping record (insert, or overwrite by `local_id`)
    async fn put(&self, item: &SyncedItem) -> anyhow::Result<()>;

    /// Merge-updates an existing mapping record
    ///
    /// Fields left unset in the patch are preserved; `last_modified` is
    /// always bumped. Returns an error if no record exists for `local_id`.
    async fn patch(&self, local_id: &LocalId, patch: &MappingPatch) -> anyhow::Result<()>;
}
