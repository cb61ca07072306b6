//! Port-level task representations
//!
//! These types describe items as the two external stores see them. They are
//! DTOs, not domain aggregates: adapters map raw wire/storage formats into
//! them, and the use cases translate between the two sides via the mapping
//! record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::newtypes::{LocalId, RemoteItemId, RemoteListId};

/// Completion status of a remote task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    /// The task is open
    #[default]
    NeedsAction,
    /// The task has been completed
    Completed,
}

impl TaskStatus {
    /// Returns true if this status means completed
    pub fn is_completed(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }

    /// Builds a status from a completion boolean
    pub fn from_completed(completed: bool) -> Self {
        if completed {
            TaskStatus::Completed
        } else {
            TaskStatus::NeedsAction
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::NeedsAction => write!(f, "needsAction"),
            TaskStatus::Completed => write!(f, "completed"),
        }
    }
}

/// An item as it exists in the local reminder store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalTask {
    /// Local identity
    pub id: LocalId,
    /// Display title
    pub title: String,
    /// Free-form notes
    pub notes: Option<String>,
    /// Due timestamp
    pub due: Option<DateTime<Utc>>,
    /// Name of the containing list, if any
    pub list_name: Option<String>,
    /// Completion flag
    pub completed: bool,
    /// When the item was completed, if known
    pub completed_at: Option<DateTime<Utc>>,
}

/// Payload for creating an item in the local store
#[derive(Debug, Clone, PartialEq)]
pub struct NewLocalTask {
    /// Display title
    pub title: String,
    /// Free-form notes
    pub notes: Option<String>,
    /// Due timestamp
    pub due: Option<DateTime<Utc>>,
    /// Name of the containing list
    pub list_name: Option<String>,
    /// Initial completion flag (pulled items may already be completed)
    pub completed: bool,
}

/// An item as it exists in the remote task service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteTask {
    /// Remote identity
    pub id: RemoteItemId,
    /// Identity of the parent list
    pub list_id: RemoteListId,
    /// Display title
    pub title: String,
    /// Free-form notes
    pub notes: Option<String>,
    /// Due timestamp
    pub due: Option<DateTime<Utc>>,
    /// Completion status
    pub status: TaskStatus,
    /// When the task was completed, if known
    pub completed_at: Option<DateTime<Utc>>,
    /// Whether the remote store has flagged this task deleted
    pub deleted: bool,
}

impl RemoteTask {
    /// Returns true if the remote task is completed
    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }
}

/// Payload for creating an item in the remote store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewRemoteTask {
    /// Display title
    pub title: String,
    /// Free-form notes
    pub notes: Option<String>,
    /// Due timestamp
    pub due: Option<DateTime<Utc>>,
    /// Initial status; the push path only ever creates open items
    pub status: TaskStatus,
}

/// Partial update of a remote task
///
/// Fields left as `None` are preserved on the remote side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteTaskPatch {
    /// New title
    pub title: Option<String>,
    /// New notes
    pub notes: Option<String>,
    /// New due timestamp
    pub due: Option<DateTime<Utc>>,
    /// New status
    pub status: Option<TaskStatus>,
    /// New completion timestamp
    pub completed_at: Option<DateTime<Utc>>,
}

impl RemoteTaskPatch {
    /// Patch that only rewrites content fields (never completion state)
    pub fn content(title: impl Into<String>, notes: Option<String>, due: Option<DateTime<Utc>>) -> Self {
        Self {
            title: Some(title.into()),
            notes,
            due,
            status: None,
            completed_at: None,
        }
    }

    /// Patch that only flips completion state
    pub fn completion(completed: bool, completed_at: Option<DateTime<Utc>>) -> Self {
        Self {
            title: None,
            notes: None,
            due: None,
            status: Some(TaskStatus::from_completed(completed)),
            completed_at: if completed { completed_at } else { None },
        }
    }
}

/// A list (container) in the remote task service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteList {
    /// Remote list identity
    pub id: RemoteListId,
    /// Display name, matched case-sensitively by find-or-create
    pub name: String,
}

/// An inbound item to be pushed to the remote store
///
/// Arrives either from the local store enumeration (with an id) or from the
/// webhook create action (possibly without one). When `local_id` is `None`
/// the engine synthesizes an identity, so re-delivery semantics are driven
/// entirely by whatever identity the caller supplies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncomingTask {
    /// Caller-supplied local identity
    pub local_id: Option<LocalId>,
    /// Display title (required)
    pub title: String,
    /// Free-form notes
    pub notes: Option<String>,
    /// Due timestamp
    pub due: Option<DateTime<Utc>>,
    /// Name of the containing list
    pub list_name: Option<String>,
}

impl From<&LocalTask> for IncomingTask {
    fn from(task: &LocalTask) -> Self {
        Self {
            local_id: Some(task.id.clone()),
            title: task.title.clone(),
            notes: task.notes.clone(),
            due: task.due,
            list_name: task.list_name.clone(),
        }
    }
}
