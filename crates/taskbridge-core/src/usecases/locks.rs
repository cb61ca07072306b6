//! Per-key exclusion for concurrent item processing
//!
//! Items within one detection phase may be processed concurrently, provided
//! no two operations target the same mapping simultaneously. [`ItemLocks`]
//! provides that per-key exclusion as a lightweight in-memory map of async
//! mutexes keyed by local or remote item id, scoped to the lifetime of one
//! pass. No store-wide lock is needed.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// In-memory lock table keyed by item identifier
#[derive(Default)]
pub struct ItemLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ItemLocks {
    /// Creates an empty lock table
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for `key`, creating it on first use
    ///
    /// The returned guard releases the lock when dropped. Locks are never
    /// removed from the table; a pass is short-lived and the table dies with
    /// it.
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }
}
