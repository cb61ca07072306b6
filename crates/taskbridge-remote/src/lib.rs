//! TaskBridge Remote - Cloud task API adapter
//!
//! HTTP client and credential handling for the cloud task-list service.
//! This crate implements the `IRemoteTaskService` and `ISecretProvider`
//! ports from `taskbridge-core` and is a driven (secondary) adapter in the
//! hexagonal architecture.
//!
//! ## Key Components
//!
//! - [`TasksClient`] - Typed HTTP client for the task API
//! - [`TokenManager`] - OAuth2 refresh-token handling with access-token cache
//! - [`KeyringSecretProvider`] - Credential storage in the system keyring
//! - [`RemoteTaskAdapter`] - Full `IRemoteTaskService` implementation

pub mod auth;
pub mod client;
pub mod provider;

pub use auth::{KeyringSecretProvider, TokenManager};
pub use client::TasksClient;
pub use provider::RemoteTaskAdapter;
