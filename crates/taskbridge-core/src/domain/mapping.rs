//! SyncedItem mapping record
//!
//! The persisted correspondence between a local item identity and a remote
//! item identity, plus the engine's last-known completion state. One record
//! exists per reconciled logical task; the record is created the first time an
//! item is pushed or pulled, mutated whenever completion state changes on
//! either side, and never deleted by normal operation (deletion sync is out
//! of scope).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::newtypes::{LocalId, RemoteItemId, RemoteListId};

/// The mapping record for one reconciled logical task
///
/// `local_id` is the primary key; the engine must never create two records
/// for the same local id. `remote_list_id` is required once an item has been
/// pushed or pulled and is absent only transiently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncedItem {
    /// Stable identifier of the item in the local store (primary key)
    local_id: LocalId,
    /// Identifier of the corresponding item in the remote store
    remote_item_id: RemoteItemId,
    /// Identifier of the remote list holding the item
    remote_list_id: Option<RemoteListId>,
    /// Display text at time of last sync (logging only, not authoritative)
    title: String,
    /// Last-known completion state, the engine's belief about consensus
    completed: bool,
    /// When the mapping record was created
    synced_at: DateTime<Utc>,
    /// When the mapping record was last updated
    last_modified: DateTime<Utc>,
}

impl SyncedItem {
    /// Creates a new mapping record with both timestamps set to now
    pub fn new(
        local_id: LocalId,
        remote_item_id: RemoteItemId,
        remote_list_id: RemoteListId,
        title: impl Into<String>,
        completed: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            local_id,
            remote_item_id,
            remote_list_id: Some(remote_list_id),
            title: title.into(),
            completed,
            synced_at: now,
            last_modified: now,
        }
    }

    /// Reconstructs a mapping record from persisted fields
    ///
    /// Used by storage adapters; does not touch timestamps.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        local_id: LocalId,
        remote_item_id: RemoteItemId,
        remote_list_id: Option<RemoteListId>,
        title: String,
        completed: bool,
        synced_at: DateTime<Utc>,
        last_modified: DateTime<Utc>,
    ) -> Self {
        Self {
            local_id,
            remote_item_id,
            remote_list_id,
            title,
            completed,
            synced_at,
            last_modified,
        }
    }

    // --- Getters ---

    /// Returns the local item identifier
    pub fn local_id(&self) -> &LocalId {
        &self.local_id
    }

    /// Returns the remote item identifier
    pub fn remote_item_id(&self) -> &RemoteItemId {
        &self.remote_item_id
    }

    /// Returns the remote list identifier, if recorded
    pub fn remote_list_id(&self) -> Option<&RemoteListId> {
        self.remote_list_id.as_ref()
    }

    /// Returns the title recorded at last sync
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the last-known completion state
    pub fn completed(&self) -> bool {
        self.completed
    }

    /// Returns when the mapping was created
    pub fn synced_at(&self) -> DateTime<Utc> {
        self.synced_at
    }

    /// Returns when the mapping was last updated
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    // --- Setters ---

    /// Re-points the mapping at a different remote item (force re-create path)
    pub fn set_remote(&mut self, remote_item_id: RemoteItemId, remote_list_id: RemoteListId) {
        self.remote_item_id = remote_item_id;
        self.remote_list_id = Some(remote_list_id);
        self.touch();
    }

    /// Updates the stored completion belief
    pub fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
        self.touch();
    }

    /// Updates the recorded title
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.touch();
    }

    /// Bumps `last_modified` to now
    pub fn touch(&mut self) {
        self.last_modified = Utc::now();
    }
}

/// Partial update of a mapping record
///
/// Fields left as `None` are preserved. Callers are required to have fetched
/// the record first; storage adapters must fail loudly when the target record
/// is absent.
#[derive(Debug, Clone, Default)]
pub struct MappingPatch {
    /// New completion belief
    pub completed: Option<bool>,
    /// New remote item id (force re-create path)
    pub remote_item_id: Option<RemoteItemId>,
    /// New remote list id (force re-create path)
    pub remote_list_id: Option<RemoteListId>,
    /// New recorded title
    pub title: Option<String>,
}

impl MappingPatch {
    /// Creates an empty patch (only bumps `last_modified`)
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the completion belief
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    /// Re-points the remote side of the mapping
    pub fn with_remote(mut self, item_id: RemoteItemId, list_id: RemoteListId) -> Self {
        self.remote_item_id = Some(item_id);
        self.remote_list_id = Some(list_id);
        self
    }

    /// Sets the recorded title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Returns true if the patch carries no field changes
    pub fn is_empty(&self) -> bool {
        self.completed.is_none()
            && self.remote_item_id.is_none()
            && self.remote_list_id.is_none()
            && self.title.is_none()
    }
}
