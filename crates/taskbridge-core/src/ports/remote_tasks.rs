//! Remote task service port (driven/secondary port)
//!
//! CRUD operations against the cloud task service's lists and items, keyed
//! by remote list/item identifiers. Pure I/O wrapper; no policy. The primary
//! implementation targets a Google-Tasks-style list+item hierarchical API,
//! but the trait is provider-agnostic.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because errors at port boundaries are
//!   adapter-specific and don't need domain-level classification.
//! - All mutating calls operate against a specific `(list_id, item_id)` pair;
//!   the client never infers list membership.
//! - `ensure_list` must itself be safe to call repeatedly; memoization of the
//!   name lookup within one adapter instance is an optimization, not a
//!   correctness requirement.

use crate::domain::{
    NewRemoteTask, RemoteItemId, RemoteList, RemoteListId, RemoteTask, RemoteTaskPatch,
};

/// Port trait for cloud task service operations
#[async_trait::async_trait]
pub trait IRemoteTaskService: Send + Sync {
    /// Retrieves every task list
    async fn list_task_lists(&self) -> anyhow::Result<Vec<RemoteList>>;

    /// Finds a list by exact (case-sensitive) name, creating it if absent
    async fn ensure_list(&self, name: &str) -> anyhow::Result<RemoteList>;

    /// Retrieves the items of a list
    ///
    /// With `include_hidden` set, the listing includes completed and deleted
    /// items; the pull path needs this full visibility.
    async fn list_tasks(
        &self,
        list_id: &RemoteListId,
        include_hidden: bool,
    ) -> anyhow::Result<Vec<RemoteTask>>;

    /// Retrieves a single task, or `None` if the remote store no longer has it
    async fn get_task(
        &self,
        list_id: &RemoteListId,
        item_id: &RemoteItemId,
    ) -> anyhow::Result<Option<RemoteTask>>;

    /// Creates a task in the given list
    async fn insert_task(
        &self,
        list_id: &RemoteListId,
        task: &NewRemoteTask,
    ) -> anyhow::Result<RemoteTask>;

    /// Merge-updates a task; fields unset in the patch are preserved
    async fn patch_task(
        &self,
        list_id: &RemoteListId,
        item_id: &RemoteItemId,
        patch: &RemoteTaskPatch,
    ) -> anyhow::Result<RemoteTask>;

    /// Deletes a task
    async fn delete_task(
        &self,
        list_id: &RemoteListId,
        item_id: &RemoteItemId,
    ) -> anyhow::Result<()>;
}
