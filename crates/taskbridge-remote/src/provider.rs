//! IRemoteTaskService implementation over the task API
//!
//! Translates between the API wire format and the domain DTOs, obtains an
//! access token from the [`TokenManager`] per call, and memoizes resolved
//! lists per adapter instance so `ensure_list` costs one round-trip per list
//! name at most.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, info, warn};

use taskbridge_core::domain::{
    NewRemoteTask, RemoteItemId, RemoteList, RemoteListId, RemoteTask, RemoteTaskPatch, TaskStatus,
};
use taskbridge_core::ports::IRemoteTaskService;

use crate::auth::TokenManager;
use crate::client::{TaskResource, TasksClient};

/// Adapter implementing the remote task service port
pub struct RemoteTaskAdapter {
    client: TasksClient,
    tokens: Arc<TokenManager>,
    /// Lists resolved by name during this instance's lifetime
    lists: DashMap<String, RemoteList>,
}

impl RemoteTaskAdapter {
    /// Creates a new adapter over the given client and token manager
    pub fn new(client: TasksClient, tokens: Arc<TokenManager>) -> Self {
        Self {
            client,
            tokens,
            lists: DashMap::new(),
        }
    }
}

// ============================================================================
// Wire conversion helpers
// ============================================================================

/// Parses an optional wire timestamp, dropping values that don't parse
///
/// A malformed `due` or `completed` must not block the whole task (or, worse,
/// the whole list) from syncing; the field is treated as absent instead.
fn parse_timestamp(task_id: &str, field: &str, value: Option<&str>) -> Option<DateTime<Utc>> {
    let value = value?;
    match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(e) => {
            warn!(task_id, field, value, error = %e, "Unparsable timestamp, ignoring field");
            None
        }
    }
}

fn status_from_wire(status: Option<&str>) -> TaskStatus {
    match status {
        Some("completed") => TaskStatus::Completed,
        _ => TaskStatus::NeedsAction,
    }
}

fn to_domain_task(list_id: &RemoteListId, resource: &TaskResource) -> Result<RemoteTask> {
    Ok(RemoteTask {
        id: RemoteItemId::new(resource.id.clone())?,
        list_id: list_id.clone(),
        title: resource.title.clone(),
        notes: resource.notes.clone(),
        due: parse_timestamp(&resource.id, "due", resource.due.as_deref()),
        status: status_from_wire(resource.status.as_deref()),
        completed_at: parse_timestamp(&resource.id, "completed", resource.completed.as_deref()),
        deleted: resource.deleted,
    })
}

fn to_wire_task(task: &NewRemoteTask) -> TaskResource {
    TaskResource {
        title: task.title.clone(),
        notes: task.notes.clone(),
        due: task.due.map(|d| d.to_rfc3339()),
        status: Some(task.status.to_string()),
        ..Default::default()
    }
}

fn to_wire_patch(patch: &RemoteTaskPatch) -> serde_json::Value {
    let mut body = serde_json::Map::new();
    if let Some(title) = &patch.title {
        body.insert("title".into(), title.clone().into());
    }
    if let Some(notes) = &patch.notes {
        body.insert("notes".into(), notes.clone().into());
    }
    if let Some(due) = patch.due {
        body.insert("due".into(), due.to_rfc3339().into());
    }
    if let Some(status) = patch.status {
        body.insert("status".into(), status.to_string().into());
        match patch.completed_at {
            Some(at) if status.is_completed() => {
                body.insert("completed".into(), at.to_rfc3339().into());
            }
            _ => {
                // Reopening clears the completion timestamp server-side.
            }
        }
    }
    serde_json::Value::Object(body)
}

#[async_trait::async_trait]
impl IRemoteTaskService for RemoteTaskAdapter {
    async fn list_task_lists(&self) -> Result<Vec<RemoteList>> {
        let token = self.tokens.access_token().await?;
        let lists = self.client.list_task_lists(&token).await?;
        lists
            .iter()
            .map(|l| {
                Ok(RemoteList {
                    id: RemoteListId::new(l.id.clone())?,
                    name: l.title.clone(),
                })
            })
            .collect()
    }

    async fn ensure_list(&self, name: &str) -> Result<RemoteList> {
        if let Some(list) = self.lists.get(name) {
            return Ok(list.clone());
        }

        let token = self.tokens.access_token().await?;
        let existing = self.client.list_task_lists(&token).await?;
        if let Some(found) = existing.iter().find(|l| l.title == name) {
            let list = RemoteList {
                id: RemoteListId::new(found.id.clone())?,
                name: found.title.clone(),
            };
            debug!(name, id = %list.id, "Resolved existing remote list");
            self.lists.insert(name.to_string(), list.clone());
            return Ok(list);
        }

        let created = self
            .client
            .create_task_list(&token, name)
            .await
            .with_context(|| format!("Failed to create remote list '{name}'"))?;
        let list = RemoteList {
            id: RemoteListId::new(created.id)?,
            name: created.title,
        };
        info!(name, id = %list.id, "Created remote list");
        self.lists.insert(name.to_string(), list.clone());
        Ok(list)
    }

    async fn list_tasks(
        &self,
        list_id: &RemoteListId,
        include_hidden: bool,
    ) -> Result<Vec<RemoteTask>> {
        let token = self.tokens.access_token().await?;
        let tasks = self
            .client
            .list_tasks(&token, list_id.as_str(), include_hidden)
            .await?;
        tasks.iter().map(|t| to_domain_task(list_id, t)).collect()
    }

    async fn get_task(
        &self,
        list_id: &RemoteListId,
        item_id: &RemoteItemId,
    ) -> Result<Option<RemoteTask>> {
        let token = self.tokens.access_token().await?;
        self.client
            .get_task(&token, list_id.as_str(), item_id.as_str())
            .await?
            .map(|t| to_domain_task(list_id, &t))
            .transpose()
    }

    async fn insert_task(
        &self,
        list_id: &RemoteListId,
        task: &NewRemoteTask,
    ) -> Result<RemoteTask> {
        let token = self.tokens.access_token().await?;
        let created = self
            .client
            .insert_task(&token, list_id.as_str(), &to_wire_task(task))
            .await?;
        to_domain_task(list_id, &created)
    }

    async fn patch_task(
        &self,
        list_id: &RemoteListId,
        item_id: &RemoteItemId,
        patch: &RemoteTaskPatch,
    ) -> Result<RemoteTask> {
        let token = self.tokens.access_token().await?;
        let updated = self
            .client
            .patch_task(
                &token,
                list_id.as_str(),
                item_id.as_str(),
                &to_wire_patch(patch),
            )
            .await?;
        to_domain_task(list_id, &updated)
    }

    async fn delete_task(&self, list_id: &RemoteListId, item_id: &RemoteItemId) -> Result<()> {
        let token = self.tokens.access_token().await?;
        self.client
            .delete_task(&token, list_id.as_str(), item_id.as_str())
            .await
    }
}
