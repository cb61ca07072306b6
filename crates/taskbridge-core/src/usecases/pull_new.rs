//! Pull remote→local (new items)
//!
//! Imports remote tasks that no mapping record knows about. The mapped-id set
//! is computed from the store up front, so items pushed earlier in the same
//! pass (or in any previous pass) are never re-imported: a remote id is
//! imported exactly once, ever, as long as the mapping survives.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::domain::{NewLocalTask, RemoteList, RemoteTask, SyncedItem};
use crate::ports::{ILocalItemSource, IMappingStore, IRemoteTaskService};

/// Summary of one pull phase
#[derive(Debug, Default)]
pub struct PullReport {
    /// Local ids created for imported remote tasks, in processing order
    pub imported: Vec<crate::domain::LocalId>,
    /// Per-item failures; the phase continues past them
    pub errors: Vec<String>,
}

/// Use case for importing unmapped remote tasks into the local store
pub struct PullNewItemsUseCase {
    remote: Arc<dyn IRemoteTaskService>,
    store: Arc<dyn IMappingStore>,
    local: Arc<dyn ILocalItemSource>,
}

impl PullNewItemsUseCase {
    /// Creates a new PullNewItemsUseCase with the required dependencies
    pub fn new(
        remote: Arc<dyn IRemoteTaskService>,
        store: Arc<dyn IMappingStore>,
        local: Arc<dyn ILocalItemSource>,
    ) -> Self {
        Self {
            remote,
            store,
            local,
        }
    }

    /// Imports every unmapped, non-deleted remote task
    pub async fn pull_all(&self) -> Result<PullReport> {
        let mapped = self.mapped_remote_ids().await?;

        let lists = self
            .remote
            .list_task_lists()
            .await
            .context("Failed to enumerate remote lists")?;

        let mut report = PullReport::default();
        for list in &lists {
            let tasks = match self.remote.list_tasks(&list.id, true).await {
                Ok(tasks) => tasks,
                Err(e) => {
                    warn!(list = %list.name, error = %e, "Failed to enumerate remote list");
                    report.errors.push(format!("pull list {}: {e:#}", list.name));
                    continue;
                }
            };

            for task in &tasks {
                if task.deleted {
                    continue;
                }
                if mapped.contains(task.id.as_str()) {
                    debug!(remote_item_id = %task.id, "Already mapped, skipping import");
                    continue;
                }
                match self.import(list, task).await {
                    Ok(local_id) => report.imported.push(local_id),
                    Err(e) => {
                        warn!(remote_item_id = %task.id, error = %e, "Import failed");
                        report.errors.push(format!("pull {}: {e:#}", task.id));
                    }
                }
            }
        }

        info!(
            imported = report.imported.len(),
            errors = report.errors.len(),
            "Pull phase complete"
        );
        Ok(report)
    }

    /// Enumerates non-deleted remote tasks with no mapping record
    ///
    /// Read-only companion to [`pull_all`](Self::pull_all), backing the
    /// webhook enumeration of items awaiting import.
    pub async fn unmapped_remote_items(&self) -> Result<Vec<RemoteTask>> {
        let mapped = self.mapped_remote_ids().await?;

        let lists = self
            .remote
            .list_task_lists()
            .await
            .context("Failed to enumerate remote lists")?;

        let mut unmapped = Vec::new();
        for list in &lists {
            let tasks = self
                .remote
                .list_tasks(&list.id, true)
                .await
                .with_context(|| format!("Failed to enumerate remote list '{}'", list.name))?;
            unmapped.extend(
                tasks
                    .into_iter()
                    .filter(|t| !t.deleted && !mapped.contains(t.id.as_str())),
            );
        }
        Ok(unmapped)
    }

    async fn mapped_remote_ids(&self) -> Result<HashSet<String>> {
        Ok(self
            .store
            .get_all()
            .await
            .context("Failed to read mapping records")?
            .iter()
            .map(|m| m.remote_item_id().as_str().to_string())
            .collect())
    }

    /// Creates the local counterpart and its mapping record
    async fn import(&self, list: &RemoteList, task: &RemoteTask) -> Result<crate::domain::LocalId> {
        let created = self
            .local
            .create_item(&NewLocalTask {
                title: task.title.clone(),
                notes: task.notes.clone(),
                due: task.due,
                list_name: Some(list.name.clone()),
                completed: task.is_completed(),
            })
            .await
            .context("Failed to create local item")?;

        self.store
            .put(&SyncedItem::new(
                created.id.clone(),
                task.id.clone(),
                list.id.clone(),
                &task.title,
                task.is_completed(),
            ))
            .await
            .context("Failed to persist mapping for imported item")?;

        info!(local_id = %created.id, remote_item_id = %task.id, list = %list.name, "Imported remote item");
        Ok(created.id)
    }
}
