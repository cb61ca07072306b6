//! Push outcome variants
//!
//! The result of pushing one item is modeled as a sum type rather than a
//! response-message string, so call sites can branch without brittle string
//! comparisons. Failure is the `Err` arm of the surrounding `Result`.

use serde::Serialize;

use super::newtypes::{RemoteItemId, RemoteListId};

/// Outcome of pushing one local item to the remote store
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PushOutcome {
    /// A new remote item was created and a mapping persisted
    Created {
        /// Identifier of the created remote item
        remote_item_id: RemoteItemId,
        /// Identifier of the list it was created in
        remote_list_id: RemoteListId,
    },
    /// The mapped remote item was updated in place (force path)
    Updated {
        /// Identifier of the updated remote item
        remote_item_id: RemoteItemId,
        /// Identifier of the list holding it
        remote_list_id: RemoteListId,
    },
    /// A mapping already existed and no force flag was set; nothing mutated
    AlreadySynced {
        /// Identifier of the previously mapped remote item
        remote_item_id: RemoteItemId,
    },
}

impl PushOutcome {
    /// Returns the remote item id the outcome refers to
    pub fn remote_item_id(&self) -> &RemoteItemId {
        match self {
            PushOutcome::Created { remote_item_id, .. }
            | PushOutcome::Updated { remote_item_id, .. }
            | PushOutcome::AlreadySynced { remote_item_id } => remote_item_id,
        }
    }

    /// Returns true if the push created a new remote item
    pub fn is_created(&self) -> bool {
        matches!(self, PushOutcome::Created { .. })
    }

    /// Returns true if the push was short-circuited as already synced
    pub fn is_already_synced(&self) -> bool {
        matches!(self, PushOutcome::AlreadySynced { .. })
    }
}
