//! Completion-state reconciliation, both directions
//!
//! The mapping record carries the engine's last-known completion belief. A
//! side whose current state differs from that belief is the side that
//! changed; the change is applied to the other side and the belief updated.
//! The pass driver runs the remote→local direction first, so when both sides
//! flipped between passes the remote state wins (first detector wins).
//!
//! A mapping whose local item has vanished is logged and left untouched so a
//! later pass can retry once the local store recovers. Deletion itself is not
//! synchronized.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::{
    LocalId, MappingPatch, RemoteItemId, RemoteTask, RemoteTaskPatch, SyncedItem,
};
use crate::ports::{ILocalItemSource, IMappingStore, IRemoteTaskService};

use super::locks::ItemLocks;

/// Summary of one completion-sync direction
#[derive(Debug, Default)]
pub struct CompletionReport {
    /// Number of completion states propagated
    pub applied: u32,
    /// Mappings skipped because their counterpart was missing
    pub skipped: u32,
    /// Per-item failures; the phase continues past them
    pub errors: Vec<String>,
}

/// One mapping whose remote completion state disagrees with the stored belief
#[derive(Debug, Clone, Serialize)]
pub struct CompletionDivergence {
    /// Local item identity
    pub local_id: LocalId,
    /// Remote item identity
    pub remote_item_id: RemoteItemId,
    /// Title recorded at last sync
    pub title: String,
    /// What the mapping believes
    pub recorded_completed: bool,
    /// What the remote store currently says
    pub remote_completed: bool,
}

/// Use case for propagating completion-state changes in either direction
pub struct CompletionSyncUseCase {
    remote: Arc<dyn IRemoteTaskService>,
    store: Arc<dyn IMappingStore>,
    local: Arc<dyn ILocalItemSource>,
    locks: Arc<ItemLocks>,
}

impl CompletionSyncUseCase {
    /// Creates a new CompletionSyncUseCase with the required dependencies
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
        }
    }

    /// Remote→local: applies remote completion flips to the local store
    pub async fn pull_completion_changes(&self) -> Result<CompletionReport> {
        let mappings = self
            .store
            .get_all()
            .await
            .context("Failed to read mapping records")?;

        let mut report = CompletionReport::default();
        for mapping in &mappings {
            match self.pull_one(mapping).await {
                Ok(SyncStep::Applied) => report.applied += 1,
                Ok(SyncStep::Skipped) => report.skipped += 1,
                Ok(SyncStep::InSync) => {}
                Err(e) => {
                    warn!(local_id = %mapping.local_id(), error = %e, "Completion pull failed");
                    report
                        .errors
                        .push(format!("completion pull {}: {e:#}", mapping.local_id()));
                }
            }
        }

        info!(
            applied = report.applied,
            skipped = report.skipped,
            errors = report.errors.len(),
            "Completion pull complete"
        );
        Ok(report)
    }

    /// Local→remote: applies local completion flips to the remote store
    pub async fn push_completion_changes(&self) -> Result<CompletionReport> {
        let mappings = self
            .store
            .get_all()
            .await
            .context("Failed to read mapping records")?;

        let mut report = CompletionReport::default();
        for mapping in &mappings {
            match self.push_one(mapping).await {
                Ok(SyncStep::Applied) => report.applied += 1,
                Ok(SyncStep::Skipped) => report.skipped += 1,
                Ok(SyncStep::InSync) => {}
                Err(e) => {
                    warn!(local_id = %mapping.local_id(), error = %e, "Completion push failed");
                    report
                        .errors
                        .push(format!("completion push {}: {e:#}", mapping.local_id()));
                }
            }
        }

        info!(
            applied = report.applied,
            skipped = report.skipped,
            errors = report.errors.len(),
            "Completion push complete"
        );
        Ok(report)
    }

    /// Enumerates mappings whose remote completion differs from the belief
    ///
    /// Read-only; backs the webhook divergence listing. A mapping whose
    /// remote task cannot be fetched is simply absent from the result.
    pub async fn pending_divergences(&self) -> Result<Vec<CompletionDivergence>> {
        let mappings = self
            .store
            .get_all()
            .await
            .context("Failed to read mapping records")?;

        let mut divergences = Vec::new();
        for mapping in &mappings {
            if let Some(task) = self.fetch_remote(mapping).await? {
                if task.is_completed() != mapping.completed() {
                    divergences.push(CompletionDivergence {
                        local_id: mapping.local_id().clone(),
                        remote_item_id: mapping.remote_item_id().clone(),
                        title: mapping.title().to_string(),
                        recorded_completed: mapping.completed(),
                        remote_completed: task.is_completed(),
                    });
                }
            }
        }
        Ok(divergences)
    }

    async fn pull_one(&self, mapping: &SyncedItem) -> Result<SyncStep> {
        let _guard = self.locks.acquire(mapping.local_id().as_str()).await;

        let Some(task) = self.fetch_remote(mapping).await? else {
            debug!(local_id = %mapping.local_id(), "Mapped remote task unavailable, skipping");
            return Ok(SyncStep::Skipped);
        };

        if task.is_completed() == mapping.completed() {
            return Ok(SyncStep::InSync);
        }

        let local = self
            .local
            .get_item(mapping.local_id())
            .await
            .context("Failed to read local item")?;
        if local.is_none() {
            // Mapping stays as-is so the next pass retries.
            warn!(local_id = %mapping.local_id(), "Local item missing, leaving mapping untouched");
            return Ok(SyncStep::Skipped);
        }

        self.local
            .set_completion(mapping.local_id(), task.is_completed(), task.completed_at)
            .await
            .context("Failed to update local completion state")?;
        self.store
            .patch(
                mapping.local_id(),
                &MappingPatch::new().with_completed(task.is_completed()),
            )
            .await
            .context("Failed to update mapping belief")?;

        info!(
            local_id = %mapping.local_id(),
            completed = task.is_completed(),
            "Applied remote completion change locally"
        );
        Ok(SyncStep::Applied)
    }

    async fn push_one(&self, mapping: &SyncedItem) -> Result<SyncStep> {
        let _guard = self.locks.acquire(mapping.local_id().as_str()).await;

        let Some(local) = self
            .local
            .get_item(mapping.local_id())
            .await
            .context("Failed to read local item")?
        else {
            debug!(local_id = %mapping.local_id(), "Local item missing, nothing to push");
            return Ok(SyncStep::Skipped);
        };

        if local.completed == mapping.completed() {
            return Ok(SyncStep::InSync);
        }

        let Some(list_id) = mapping.remote_list_id() else {
            warn!(local_id = %mapping.local_id(), "Mapping lacks a list id, skipping");
            return Ok(SyncStep::Skipped);
        };

        self.remote
            .patch_task(
                list_id,
                mapping.remote_item_id(),
                &RemoteTaskPatch::completion(local.completed, local.completed_at),
            )
            .await
            .context("Failed to update remote completion state")?;
        self.store
            .patch(
                mapping.local_id(),
                &MappingPatch::new().with_completed(local.completed),
            )
            .await
            .context("Failed to update mapping belief")?;

        info!(
            local_id = %mapping.local_id(),
            completed = local.completed,
            "Applied local completion change remotely"
        );
        Ok(SyncStep::Applied)
    }

    async fn fetch_remote(&self, mapping: &SyncedItem) -> Result<Option<RemoteTask>> {
        let Some(list_id) = mapping.remote_list_id() else {
            return Ok(None);
        };
        Ok(self
            .remote
            .get_task(list_id, mapping.remote_item_id())
            .await
            .context("Failed to fetch mapped remote task")?
            .filter(|t| !t.deleted))
    }
}

enum SyncStep {
    Applied,
    Skipped,
    InSync,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::testutil::{
        InMemoryLocalItems, InMemoryMappingStore, InMemoryRemoteTasks,
    };
    use crate::domain::{RemoteListId, TaskStatus};
    use chrono::Utc;
    use std::sync::atomic::Ordering;

    fn setup() -> (
        Arc<InMemoryRemoteTasks>,
        Arc<InMemoryMappingStore>,
        Arc<InMemoryLocalItems>,
        CompletionSyncUseCase,
    ) {
        let remote = Arc::new(InMemoryRemoteTasks::new());
        let store = Arc::new(InMemoryMappingStore::new());
        let local = Arc::new(InMemoryLocalItems::new());
        let usecase = CompletionSyncUseCase::new(
            remote.clone(),
            store.clone(),
            local.clone(),
            Arc::new(ItemLocks::new()),
        );
        (remote, store, local, usecase)
    }

    fn mapping(local: &str, item: &str, list: &str, completed: bool) -> SyncedItem {
        SyncedItem::new(
            LocalId::new(local.to_string()).unwrap(),
            RemoteItemId::new(item.to_string()).unwrap(),
            RemoteListId::new(list.to_string()).unwrap(),
            "Report",
            completed,
        )
    }

    #[tokio::test]
    async fn test_remote_completion_propagates_to_local() {
        let (remote, store, local, usecase) = setup();
        let list = remote.add_list("l1", "Work");
        remote.add_task(&list, "r1", "Report", true);
        let local_id = local.add("a1", "Report", Some("Work"), false);
        store.insert(mapping("a1", "r1", "l1", false));

        let report = usecase.pull_completion_changes().await.unwrap();

        assert_eq!(report.applied, 1);
        assert!(local.item(&local_id).unwrap().completed);
        assert!(store.get(&local_id).await.unwrap().unwrap().completed());
    }

    #[tokio::test]
    async fn test_local_completion_propagates_to_remote() {
        let (remote, store, local, usecase) = setup();
        let list = remote.add_list("l1", "Work");
        remote.add_task(&list, "r1", "Report", false);
        local.add("a1", "Report", Some("Work"), true);
        store.insert(mapping("a1", "r1", "l1", false));

        let report = usecase.push_completion_changes().await.unwrap();

        assert_eq!(report.applied, 1);
        let task = remote.task("r1").unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert!(task.completed_at.is_some());
        let stored = store
            .get(&LocalId::new("a1".to_string()).unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(stored.completed());
    }

    #[tokio::test]
    async fn test_reopening_propagates_both_ways() {
        let (remote, store, local, usecase) = setup();
        let list = remote.add_list("l1", "Work");
        remote.add_task(&list, "r1", "Report", false);
        let local_id = local.add("a1", "Report", Some("Work"), true);
        store.insert(mapping("a1", "r1", "l1", true));

        // Remote was reopened; pull applies it locally.
        let report = usecase.pull_completion_changes().await.unwrap();
        assert_eq!(report.applied, 1);
        let item = local.item(&local_id).unwrap();
        assert!(!item.completed);
        assert!(item.completed_at.is_none());
    }

    #[tokio::test]
    async fn test_in_sync_mappings_cause_no_writes() {
        let (remote, store, local, usecase) = setup();
        let list = remote.add_list("l1", "Work");
        remote.add_task(&list, "r1", "Report", false);
        local.add("a1", "Report", Some("Work"), false);
        store.insert(mapping("a1", "r1", "l1", false));

        let pull = usecase.pull_completion_changes().await.unwrap();
        let push = usecase.push_completion_changes().await.unwrap();

        assert_eq!(pull.applied, 0);
        assert_eq!(push.applied, 0);
        assert_eq!(remote.patch_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_local_item_leaves_mapping_untouched() {
        let (remote, store, _, usecase) = setup();
        let list = remote.add_list("l1", "Work");
        remote.add_task(&list, "r1", "Report", true);
        store.insert(mapping("a1", "r1", "l1", false));

        let report = usecase.pull_completion_changes().await.unwrap();

        assert_eq!(report.applied, 0);
        assert_eq!(report.skipped, 1);
        assert!(report.errors.is_empty());
        let stored = store
            .get(&LocalId::new("a1".to_string()).unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(!stored.completed(), "belief must survive for the next pass");
    }

    #[tokio::test]
    async fn test_missing_remote_task_is_skipped() {
        let (remote, store, local, usecase) = setup();
        remote.add_list("l1", "Work");
        local.add("a1", "Report", Some("Work"), true);
        store.insert(mapping("a1", "r1", "l1", false));

        let report = usecase.pull_completion_changes().await.unwrap();

        assert_eq!(report.applied, 0);
        assert_eq!(report.skipped, 1);
    }

    #[tokio::test]
    async fn test_pending_divergences_lists_only_mismatches() {
        let (remote, store, _, usecase) = setup();
        let list = remote.add_list("l1", "Work");
        remote.add_task(&list, "r1", "Flipped", true);
        remote.add_task(&list, "r2", "Steady", false);
        store.insert(mapping("a1", "r1", "l1", false));
        store.insert(mapping("a2", "r2", "l1", false));

        let divergences = usecase.pending_divergences().await.unwrap();

        assert_eq!(divergences.len(), 1);
        assert_eq!(divergences[0].remote_item_id.as_str(), "r1");
        assert!(!divergences[0].recorded_completed);
        assert!(divergences[0].remote_completed);
    }

    #[tokio::test]
    async fn test_completion_timestamp_carried_from_local() {
        let (remote, store, local, usecase) = setup();
        let list = remote.add_list("l1", "Work");
        remote.add_task(&list, "r1", "Report", false);
        local.add("a1", "Report", Some("Work"), false);
        store.insert(mapping("a1", "r1", "l1", false));

        let local_id = LocalId::new("a1".to_string()).unwrap();
        let done_at = Utc::now();
        local
            .set_completion(&local_id, true, Some(done_at))
            .await
            .unwrap();

        usecase.push_completion_changes().await.unwrap();

        assert_eq!(remote.task("r1").unwrap().completed_at, Some(done_at));
    }
}
