//! Use cases - the reconciliation engine
//!
//! Four idempotent operations, each designed to be safely re-run every pass:
//!
//! - [`PushNewItemsUseCase`] - push unmapped local items to the remote store
//! - [`PullNewItemsUseCase`] - import unmapped remote items into the local store
//! - [`CompletionSyncUseCase`] - propagate completion-state divergence in
//!   either direction
//! - [`SyncPass`] - one full pass, running the phases in fixed order
//!
//! Per-item failures are collected and reported; they never abort a phase.

pub mod completion;
pub mod locks;
pub mod pull_new;
pub mod push_new;
pub mod run_pass;

pub use completion::{CompletionDivergence, CompletionReport, CompletionSyncUseCase};
pub use locks::ItemLocks;
pub use pull_new::{PullNewItemsUseCase, PullReport};
pub use push_new::{PushNewItemsUseCase, PushReport};
pub use run_pass::{PassSummary, SyncPass};

#[cfg(test)]
pub(crate) mod testutil;
