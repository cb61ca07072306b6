//! Domain error types
//!
//! This module defines error types specific to domain operations,
//! including identifier validation failures and mapping lookup errors.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid local item identifier
    #[error("Invalid local id: {0}")]
    InvalidLocalId(String),

    /// Invalid remote item identifier
    #[error("Invalid remote item id: {0}")]
    InvalidRemoteItemId(String),

    /// Invalid remote list identifier
    #[error("Invalid remote list id: {0}")]
    InvalidRemoteListId(String),

    /// An inbound item is missing its required title
    #[error("Item title must not be empty")]
    MissingTitle,

    /// A patch targeted a mapping record that does not exist
    #[error("No mapping record for local id: {0}")]
    MappingNotFound(String),

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}
