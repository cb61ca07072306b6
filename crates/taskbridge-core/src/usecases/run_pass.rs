//! One full reconciliation pass
//!
//! Phase order is fixed and load-bearing: completion pull runs before
//! completion push so a flip seen on both sides resolves to the remote state,
//! and both pulls run before the new-item push so freshly imported items are
//! already mapped when the push phase enumerates local items (no ping-pong).

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tracing::{info, instrument};

use crate::domain::{LocalId, PushOutcome};

use super::completion::CompletionSyncUseCase;
use super::pull_new::PullNewItemsUseCase;
use super::push_new::PushNewItemsUseCase;

/// Aggregate result of one pass
///
/// A pass as a whole only fails on configuration-level problems; per-item
/// trouble lands in `errors` and the pass keeps going.
#[derive(Debug, Default)]
pub struct PassSummary {
    /// Completion states applied locally (remote→local)
    pub completions_pulled: u32,
    /// Completion states applied remotely (local→remote)
    pub completions_pushed: u32,
    /// Remote items imported into the local store
    pub items_pulled: u32,
    /// Per-item outcomes of the new-item push phase
    pub push_outcomes: Vec<(LocalId, PushOutcome)>,
    /// All per-item failures across all four phases
    pub errors: Vec<String>,
    /// Wall-clock duration of the pass
    pub duration_ms: u64,
}

impl PassSummary {
    /// Remote items created by the push phase
    pub fn items_pushed(&self) -> u32 {
        self.push_outcomes
            .iter()
            .filter(|(_, o)| o.is_created())
            .count() as u32
    }

    /// Returns true if no phase reported any per-item failure
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Orchestrates the four reconciliation phases in fixed order
pub struct SyncPass {
    completion: Arc<CompletionSyncUseCase>,
    pull: Arc<PullNewItemsUseCase>,
    push: Arc<PushNewItemsUseCase>,
}

impl SyncPass {
    /// Creates a new SyncPass over the three phase use cases
    pub fn new(
        completion: Arc<CompletionSyncUseCase>,
        pull: Arc<PullNewItemsUseCase>,
        push: Arc<PushNewItemsUseCase>,
    ) -> Self {
        Self {
            completion,
            pull,
            push,
        }
    }

    /// Runs one pass: completion pull, completion push, item pull, item push
    ///
    /// `exclude` carries local ids the caller already knows are pushed (its
    /// idempotency cache); they are filtered out of the push phase input.
    ///
    /// # Errors
    ///
    /// Fails only when a phase cannot run at all (store or list enumeration
    /// unreachable). Per-item failures are collected in the summary.
    #[instrument(skip_all)]
    pub async fn run(&self, exclude: &HashSet<LocalId>) -> Result<PassSummary> {
        let started = Instant::now();
        let mut summary = PassSummary::default();

        let pulled = self.completion.pull_completion_changes().await?;
        summary.completions_pulled = pulled.applied;
        summary.errors.extend(pulled.errors);

        let pushed = self.completion.push_completion_changes().await?;
        summary.completions_pushed = pushed.applied;
        summary.errors.extend(pushed.errors);

        let imported = self.pull.pull_all().await?;
        summary.items_pulled = imported.imported.len() as u32;
        summary.errors.extend(imported.errors);

        let report = self.push.push_all(exclude).await?;
        summary.push_outcomes = report.outcomes;
        summary.errors.extend(report.errors);

        summary.duration_ms = started.elapsed().as_millis() as u64;
        info!(
            completions_pulled = summary.completions_pulled,
            completions_pushed = summary.completions_pushed,
            items_pulled = summary.items_pulled,
            items_pushed = summary.items_pushed(),
            errors = summary.errors.len(),
            duration_ms = summary.duration_ms,
            "Pass complete"
        );
        Ok(summary)
    }
}
