//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the domain core
//! depends on, but whose implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IMappingStore`] - Persistent storage for mapping records
//! - [`IRemoteTaskService`] - CRUD against the cloud task service
//! - [`ILocalItemSource`] - Enumeration and mutation of local reminder items
//! - [`ISecretProvider`] - Retrieval of the remote API credentials

pub mod local_items;
pub mod mapping_store;
pub mod remote_tasks;
pub mod secrets;

pub use local_items::ILocalItemSource;
pub use mapping_store::IMappingStore;
pub use remote_tasks::IRemoteTaskService;
pub use secrets::{ApiSecrets, ISecretProvider, SecretCache};
