//! Local item source port (driven/secondary port)
//!
//! Enumeration and mutation of items in the local reminder store by local
//! identity. Pure I/O wrapper; no policy.
//!
//! ## Design Notes
//!
//! - `incomplete_items` is the only enumeration the push path uses: completed
//!   local items are invisible to it by construction, which is why the push
//!   path only ever creates open remote items.
//! - `get_item` returns `None` for an id the local store no longer knows;
//!   completion reconciliation treats that as skip-and-retry-next-pass.

use chrono::{DateTime, Utc};

use crate::domain::{LocalId, LocalTask, NewLocalTask};

/// Port trait for local reminder store operations
#[async_trait::async_trait]
pub trait ILocalItemSource: Send + Sync {
    /// Enumerates all items currently in the incomplete state
    async fn incomplete_items(&self) -> anyhow::Result<Vec<LocalTask>>;

    /// Retrieves a single item by local id
    async fn get_item(&self, local_id: &LocalId) -> anyhow::Result<Option<LocalTask>>;

    /// Creates an item, returning it with its assigned local identity
    async fn create_item(&self, task: &NewLocalTask) -> anyhow::Result<LocalTask>;

    /// Sets an item's completion flag and completion timestamp
    async fn set_completion(
        &self,
        local_id: &LocalId,
        completed: bool,
        completed_at: Option<DateTime<Utc>>,
    ) -> anyhow::Result<()>;
}
