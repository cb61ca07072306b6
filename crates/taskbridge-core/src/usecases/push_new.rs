//! Push local→remote (new items)
//!
//! Detects local items with no mapping record and creates their remote
//! counterparts. Re-running is safe: an existing mapping short-circuits as
//! [`PushOutcome::AlreadySynced`] with zero remote mutation, which is the
//! idempotency guarantee for stateless passes.
//!
//! With the force flag set, an already-mapped item is updated in place
//! (title/notes/due only; completion is never overwritten here, so a
//! concurrent remote-side completion cannot be clobbered). If the mapped
//! remote item has disappeared out-of-band, exactly one new remote item is
//! created and the mapping is re-pointed at it.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::domain::{
    IncomingTask, LocalId, MappingPatch, NewRemoteTask, PushOutcome, SyncedItem, TaskStatus,
    DEFAULT_LIST_NAME,
};
use crate::domain::DomainError;
use crate::ports::{ILocalItemSource, IMappingStore, IRemoteTaskService};

use super::locks::ItemLocks;

/// Summary of one push phase
#[derive(Debug, Default)]
pub struct PushReport {
    /// Outcome per processed item, in processing order
    pub outcomes: Vec<(LocalId, PushOutcome)>,
    /// Per-item failures; the phase continues past them
    pub errors: Vec<String>,
}

impl PushReport {
    /// Number of items that resulted in a remote create
    pub fn created(&self) -> u32 {
        self.outcomes.iter().filter(|(_, o)| o.is_created()).count() as u32
    }

    /// Number of items short-circuited as already synced
    pub fn already_synced(&self) -> u32 {
        self.outcomes
            .iter()
            .filter(|(_, o)| o.is_already_synced())
            .count() as u32
    }
}

/// Use case for pushing unmapped local items to the remote store
pub struct PushNewItemsUseCase {
    remote: Arc<dyn IRemoteTaskService>,
    store: Arc<dyn IMappingStore>,
    local: Arc<dyn ILocalItemSource>,
    locks: Arc<ItemLocks>,
    default_list: String,
}

impl PushNewItemsUseCase {
    /// Creates a new PushNewItemsUseCase with the required dependencies
    pub fn new(
        remote: Arc<dyn IRemoteTaskService>,
        store: Arc<dyn IMappingStore>,
        local: Arc<dyn ILocalItemSource>,
        locks: Arc<ItemLocks>,
    ) -> Self {
        Self {
            remote,
            store,
            local,
            locks,
            default_list: DEFAULT_LIST_NAME.to_string(),
        }
    }

    /// Overrides the list that items without a container are pushed into
    /// (`sync.default_list` in the config file)
    pub fn with_default_list(mut self, name: impl Into<String>) -> Self {
        self.default_list = name.into();
        self
    }

    /// Pushes a single inbound item
    ///
    /// Returns the local identity the item was processed under (synthesized
    /// when the caller supplied none) together with the [`PushOutcome`].
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MissingTitle` before any store mutation when the
    /// title is empty, or the underlying adapter error on I/O failure.
    pub async fn push_one(
        &self,
        item: &IncomingTask,
        force: bool,
    ) -> Result<(LocalId, PushOutcome)> {
        if item.title.trim().is_empty() {
            return Err(DomainError::MissingTitle.into());
        }

        let local_id = item
            .local_id
            .clone()
            .unwrap_or_else(|| {
                let id = LocalId::generate();
                debug!(local_id = %id, "No caller-supplied identity, synthesized one");
                id
            });

        let _guard = self.locks.acquire(local_id.as_str()).await;

        let mapping = self
            .store
            .get(&local_id)
            .await
            .context("Failed to look up mapping record")?;

        let outcome = match mapping {
            Some(existing) if !force => {
                debug!(local_id = %local_id, "Already synced, skipping");
                PushOutcome::AlreadySynced {
                    remote_item_id: existing.remote_item_id().clone(),
                }
            }
            Some(existing) => self.force_update(&local_id, &existing, item).await?,
            None => self.create(&local_id, item).await?,
        };

        Ok((local_id, outcome))
    }

    /// Pushes every incomplete local item not in `exclude`
    ///
    /// `exclude` carries the caller's idempotency-cache entries; the mapping
    /// store would skip them anyway, this just avoids the lookups.
    pub async fn push_all(&self, exclude: &HashSet<LocalId>) -> Result<PushReport> {
        let items = self
            .local
            .incomplete_items()
            .await
            .context("Failed to enumerate incomplete local items")?;

        let mut report = PushReport::default();
        for task in &items {
            if exclude.contains(&task.id) {
                debug!(local_id = %task.id, "In idempotency cache, skipping");
                continue;
            }
            match self.push_one(&IncomingTask::from(task), false).await {
                Ok((local_id, outcome)) => report.outcomes.push((local_id, outcome)),
                Err(e) => {
                    warn!(local_id = %task.id, error = %e, "Push failed for item");
                    report.errors.push(format!("push {}: {e:#}", task.id));
                }
            }
        }

        info!(
            created = report.created(),
            already_synced = report.already_synced(),
            errors = report.errors.len(),
            "Push phase complete"
        );
        Ok(report)
    }

    /// Creates a remote item in the resolved list and persists a new mapping
    ///
    /// The push path only ever creates open items: a local item visible to
    /// this path is incomplete by construction.
    async fn create(&self, local_id: &LocalId, item: &IncomingTask) -> Result<PushOutcome> {
        let list_name = item.list_name.as_deref().unwrap_or(&self.default_list);
        let list = self
            .remote
            .ensure_list(list_name)
            .await
            .with_context(|| format!("Failed to resolve remote list '{list_name}'"))?;

        let created = self
            .remote
            .insert_task(
                &list.id,
                &NewRemoteTask {
                    title: item.title.clone(),
                    notes: item.notes.clone(),
                    due: item.due,
                    status: TaskStatus::NeedsAction,
                },
            )
            .await
            .context("Failed to create remote task")?;

        self.store
            .put(&SyncedItem::new(
                local_id.clone(),
                created.id.clone(),
                list.id.clone(),
                &item.title,
                false,
            ))
            .await
            .context("Failed to persist new mapping record")?;

        info!(local_id = %local_id, remote_item_id = %created.id, list = list_name, "Pushed new item");
        Ok(PushOutcome::Created {
            remote_item_id: created.id,
            remote_list_id: list.id,
        })
    }

    /// Force path: update in place when the mapped remote item still exists,
    /// otherwise fall back to a fresh create and re-point the mapping
    async fn force_update(
        &self,
        local_id: &LocalId,
        existing: &SyncedItem,
        item: &IncomingTask,
    ) -> Result<PushOutcome> {
        let alive = match existing.remote_list_id() {
            Some(list_id) => self
                .remote
                .get_task(list_id, existing.remote_item_id())
                .await
                .context("Failed to re-validate mapped remote task")?
                .filter(|t| !t.deleted)
                .map(|t| (list_id.clone(), t)),
            None => None,
        };

        match alive {
            Some((list_id, _)) => {
                // Completion state is intentionally not touched here.
                self.remote
                    .patch_task(
                        &list_id,
                        existing.remote_item_id(),
                        &crate::domain::RemoteTaskPatch::content(
                            &item.title,
                            item.notes.clone(),
                            item.due,
                        ),
                    )
                    .await
                    .context("Failed to update mapped remote task")?;

                self.store
                    .patch(local_id, &MappingPatch::new().with_title(&item.title))
                    .await
                    .context("Failed to touch mapping record after update")?;

                info!(local_id = %local_id, remote_item_id = %existing.remote_item_id(), "Force-updated mapped item");
                Ok(PushOutcome::Updated {
                    remote_item_id: existing.remote_item_id().clone(),
                    remote_list_id: list_id,
                })
            }
            None => {
                warn!(
                    local_id = %local_id,
                    remote_item_id = %existing.remote_item_id(),
                    "Mapped remote task gone, re-creating"
                );

                let list_name = item.list_name.as_deref().unwrap_or(&self.default_list);
                let list = self
                    .remote
                    .ensure_list(list_name)
                    .await
                    .with_context(|| format!("Failed to resolve remote list '{list_name}'"))?;

                let created = self
                    .remote
                    .insert_task(
                        &list.id,
                        &NewRemoteTask {
                            title: item.title.clone(),
                            notes: item.notes.clone(),
                            due: item.due,
                            status: TaskStatus::NeedsAction,
                        },
                    )
                    .await
                    .context("Failed to re-create remote task")?;

                self.store
                    .patch(
                        local_id,
                        &MappingPatch::new()
                            .with_remote(created.id.clone(), list.id.clone())
                            .with_title(&item.title),
                    )
                    .await
                    .context("Failed to re-point mapping record")?;

                Ok(PushOutcome::Created {
                    remote_item_id: created.id,
                    remote_list_id: list.id,
                })
            }
        }
    }
}
