//! JSON-file implementation of ILocalItemSource
//!
//! The reminder store is a flat JSON array of items on disk, rewritten as a
//! whole on every mutation. A missing file reads as an empty store. Writes
//! go through a temp file plus rename so a crash never leaves a truncated
//! store behind. An internal mutex serializes file access within the
//! process; the engine's per-item locks handle logical exclusion above this.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info};

use taskbridge_core::domain::{LocalId, LocalTask, NewLocalTask};
use taskbridge_core::ports::ILocalItemSource;

/// File-backed local reminder store
pub struct JsonLocalItemStore {
    path: PathBuf,
    io: Mutex<()>,
}

impl JsonLocalItemStore {
    /// Creates a store over the given JSON file
    ///
    /// The file is created on first write; a missing file reads as empty.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            io: Mutex::new(()),
        }
    }

    /// Returns the path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<LocalTask>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).with_context(|| {
                format!("Failed to parse reminder file {}", self.path.display())
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("Failed to read reminder file {}", self.path.display()))),
        }
    }

    async fn save(&self, items: &[LocalTask]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create store directory {}", parent.display())
            })?;
        }

        let json = serde_json::to_vec_pretty(items).context("Failed to serialize reminders")?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        debug!(path = %self.path.display(), count = items.len(), "Reminder file saved");
        Ok(())
    }
}

#[async_trait::async_trait]
impl ILocalItemSource for JsonLocalItemStore {
    async fn incomplete_items(&self) -> Result<Vec<LocalTask>> {
        let _guard = self.io.lock().await;
        Ok(self
            .load()
            .await?
            .into_iter()
            .filter(|t| !t.completed)
            .collect())
    }

    async fn get_item(&self, local_id: &LocalId) -> Result<Option<LocalTask>> {
        let _guard = self.io.lock().await;
        Ok(self.load().await?.into_iter().find(|t| &t.id == local_id))
    }

    async fn create_item(&self, task: &NewLocalTask) -> Result<LocalTask> {
        let _guard = self.io.lock().await;
        let mut items = self.load().await?;

        let created = LocalTask {
            id: LocalId::generate(),
            title: task.title.clone(),
            notes: task.notes.clone(),
            due: task.due,
            list_name: task.list_name.clone(),
            completed: task.completed,
            completed_at: task.completed.then(Utc::now),
        };
        items.push(created.clone());
        self.save(&items).await?;

        info!(local_id = %created.id, title = %created.title, "Local reminder created");
        Ok(created)
    }

    async fn set_completion(
        &self,
        local_id: &LocalId,
        completed: bool,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let _guard = self.io.lock().await;
        let mut items = self.load().await?;

        let item = items
            .iter_mut()
            .find(|t| &t.id == local_id)
            .with_context(|| format!("Local item not found: {local_id}"))?;
        item.completed = completed;
        item.completed_at = if completed {
            completed_at.or_else(|| Some(Utc::now()))
        } else {
            None
        };

        self.save(&items).await?;
        info!(local_id = %local_id, completed, "Local completion updated");
        Ok(())
    }
}
