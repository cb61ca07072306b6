//! TaskBridge Store - Mapping persistence
//!
//! SQLite-based storage for the mapping records that tie local reminder
//! identities to remote task identities. This crate implements the
//! `IMappingStore` port from `taskbridge-core` and is a driven (secondary)
//! adapter in the hexagonal architecture.
//!
//! ## Key Components
//!
//! - [`SqliteMappingStore`] - Full `IMappingStore` implementation; owns its
//!   connection pool and applies the schema on open
//! - [`StoreError`] - Error types for store operations
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use taskbridge_store::SqliteMappingStore;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let store =
//!     SqliteMappingStore::open(Path::new("/home/user/.local/share/taskbridge/mappings.db"))
//!         .await?;
//! // Use store as IMappingStore...
//! # Ok(())
//! # }
//! ```

pub mod repository;

pub use repository::SqliteMappingStore;

/// Errors that can occur during store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Failed to establish a database connection
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A database query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Schema migration failed
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Serialization or deserialization of domain types failed
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::QueryFailed(e.to_string())
    }
}
