//! SQLite implementation of IMappingStore
//!
//! Concrete SQLite-backed implementation of the mapping store port defined
//! in taskbridge-core. Newtypes are stored as TEXT via their string forms
//! and timestamps as ISO 8601 (`to_rfc3339`).
//!
//! The store owns its pool: [`SqliteMappingStore::open`] creates the
//! database file (and parent directories) on first use, enables WAL mode,
//! and applies the schema before returning. The whole store is one table
//! plus two indexes, so there is no separate migration machinery.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use taskbridge_core::domain::{
    DomainError, LocalId, MappingPatch, RemoteItemId, RemoteListId, SyncedItem,
};
use taskbridge_core::ports::IMappingStore;

use crate::StoreError;

/// Mapping-record schema, applied idempotently on every open
const SCHEMA: &str = include_str!("migrations/20260801_initial.sql");

/// SQLite-based implementation of the mapping store port
///
/// Writes rely on the WAL journal mode and a 5-second busy timeout set up
/// in [`open`](SqliteMappingStore::open).
pub struct SqliteMappingStore {
    pool: SqlitePool,
}

impl SqliteMappingStore {
    /// Opens (creating if necessary) the mapping database at `db_path`
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ConnectionFailed` if the file or its parent
    /// directory cannot be created, or `StoreError::MigrationFailed` if the
    /// schema cannot be applied.
    pub async fn open(db_path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::ConnectionFailed(format!(
                    "Failed to create database directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| {
                StoreError::ConnectionFailed(format!(
                    "Failed to open mapping database at {}: {}",
                    db_path.display(),
                    e
                ))
            })?;

        let store = Self::with_schema(pool).await?;
        tracing::info!(path = %db_path.display(), "Mapping database opened");
        Ok(store)
    }

    /// Opens an in-memory mapping database for tests
    ///
    /// Capped at one connection: SQLite in-memory databases are
    /// per-connection, so a second connection would see an empty schema.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| {
                StoreError::ConnectionFailed(format!("Failed to open in-memory database: {}", e))
            })?;

        Self::with_schema(pool).await
    }

    async fn with_schema(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::raw_sql(SCHEMA).execute(&pool).await.map_err(|e| {
            StoreError::MigrationFailed(format!("Failed to apply mapping schema: {}", e))
        })?;
        Ok(Self { pool })
    }
}

/// Parse a DateTime<Utc> from an ISO 8601 string
fn parse_datetime(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            StoreError::SerializationError(format!("Failed to parse datetime '{}': {}", s, e))
        })
}

/// Reconstruct a SyncedItem from a database row
fn synced_item_from_row(row: &SqliteRow) -> Result<SyncedItem, StoreError> {
    let local_id: String = row.get("local_id");
    let remote_item_id: String = row.get("remote_item_id");
    let remote_list_id: Option<String> = row.get("remote_list_id");
    let title: String = row.get("title");
    let completed: bool = row.get("completed");
    let synced_at: String = row.get("synced_at");
    let last_modified: String = row.get("last_modified");

    let local_id = LocalId::new(local_id)
        .map_err(|e| StoreError::SerializationError(e.to_string()))?;
    let remote_item_id = RemoteItemId::new(remote_item_id)
        .map_err(|e| StoreError::SerializationError(e.to_string()))?;
    let remote_list_id = remote_list_id
        .map(RemoteListId::new)
        .transpose()
        .map_err(|e| StoreError::SerializationError(e.to_string()))?;

    Ok(SyncedItem::from_parts(
        local_id,
        remote_item_id,
        remote_list_id,
        title,
        completed,
        parse_datetime(&synced_at)?,
        parse_datetime(&last_modified)?,
    ))
}

#[async_trait::async_trait]
impl IMappingStore for SqliteMappingStore {
    async fn get(&self, local_id: &LocalId) -> anyhow::Result<Option<SyncedItem>> {
        let row = sqlx::query("SELECT * FROM synced_items WHERE local_id = ?")
            .bind(local_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from)?;

        row.as_ref().map(synced_item_from_row).transpose().map_err(Into::into)
    }

    async fn get_all(&self) -> anyhow::Result<Vec<SyncedItem>> {
        let rows = sqlx::query("SELECT * FROM synced_items ORDER BY synced_at ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from)?;

        rows.iter()
            .map(synced_item_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    async fn put(&self, item: &SyncedItem) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO synced_items
                (local_id, remote_item_id, remote_list_id, title, completed, synced_at, last_modified)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(local_id) DO UPDATE SET
                remote_item_id = excluded.remote_item_id,
                remote_list_id = excluded.remote_list_id,
                title = excluded.title,
                completed = excluded.completed,
                last_modified = excluded.last_modified
            "#,
        )
        .bind(item.local_id().as_str())
        .bind(item.remote_item_id().as_str())
        .bind(item.remote_list_id().map(|l| l.as_str()))
        .bind(item.title())
        .bind(item.completed())
        .bind(item.synced_at().to_rfc3339())
        .bind(item.last_modified().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(StoreError::from)?;

        tracing::debug!(local_id = %item.local_id(), "Mapping record saved");
        Ok(())
    }

    async fn patch(&self, local_id: &LocalId, patch: &MappingPatch) -> anyhow::Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE synced_items SET
                completed = COALESCE(?, completed),
                remote_item_id = COALESCE(?, remote_item_id),
                remote_list_id = COALESCE(?, remote_list_id),
                title = COALESCE(?, title),
                last_modified = ?
            WHERE local_id = ?
            "#,
        )
        .bind(patch.completed)
        .bind(patch.remote_item_id.as_ref().map(|r| r.as_str()))
        .bind(patch.remote_list_id.as_ref().map(|l| l.as_str()))
        .bind(patch.title.as_deref())
        .bind(Utc::now().to_rfc3339())
        .bind(local_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(StoreError::from)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::MappingNotFound(local_id.to_string()).into());
        }

        tracing::debug!(local_id = %local_id, "Mapping record patched");
        Ok(())
    }
}
