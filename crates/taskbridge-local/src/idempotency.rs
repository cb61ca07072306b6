//! Push idempotency cache file
//!
//! A JSON map of local id to the remote item it was pushed as, kept by the
//! pass driver to avoid re-feeding already-pushed items into the push phase.
//! The mapping database remains authoritative; losing this file costs a few
//! redundant store lookups on the next pass, never duplicates.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use taskbridge_core::domain::{LocalId, RemoteItemId};

/// One cached push result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdempotencyEntry {
    /// Remote item the local id was pushed as
    pub remote_item_id: RemoteItemId,
    /// Title at push time, for log readability only
    pub title: String,
    /// When the push happened
    pub synced_at: DateTime<Utc>,
}

/// File-backed record of already-pushed local ids
#[derive(Debug)]
pub struct IdempotencyFile {
    path: PathBuf,
    entries: HashMap<LocalId, IdempotencyEntry>,
}

impl IdempotencyFile {
    /// Loads the cache from `path`; a missing file loads as empty
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("Failed to parse idempotency file {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(anyhow::Error::new(e).context(format!(
                    "Failed to read idempotency file {}",
                    path.display()
                )))
            }
        };

        debug!(path = %path.display(), entries = entries.len(), "Idempotency cache loaded");
        Ok(Self { path, entries })
    }

    /// Returns the path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Local ids known to have been pushed already
    pub fn pushed_ids(&self) -> HashSet<LocalId> {
        self.entries.keys().cloned().collect()
    }

    /// Returns true if the given local id is recorded
    pub fn contains(&self, local_id: &LocalId) -> bool {
        self.entries.contains_key(local_id)
    }

    /// Number of recorded entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no entries are recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records a push result, replacing any previous entry for the id
    pub fn record(&mut self, local_id: LocalId, remote_item_id: RemoteItemId, title: &str) {
        self.entries.insert(
            local_id,
            IdempotencyEntry {
                remote_item_id,
                title: title.to_string(),
                synced_at: Utc::now(),
            },
        );
    }

    /// Persists the cache, creating parent directories as needed
    pub async fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create cache directory {}", parent.display())
            })?;
        }

        let json =
            serde_json::to_vec_pretty(&self.entries).context("Failed to serialize cache")?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        debug!(path = %self.path.display(), entries = self.entries.len(), "Idempotency cache saved");
        Ok(())
    }
}
