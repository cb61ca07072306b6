//! TaskBridge Local - Device-resident reminder store adapter
//!
//! JSON-file-backed implementation of the `ILocalItemSource` port from
//! `taskbridge-core`, plus the push idempotency cache file the pass driver
//! keeps next to it. Both are driven (secondary) adapters in the hexagonal
//! architecture.
//!
//! ## Key Components
//!
//! - [`JsonLocalItemStore`] - Full `ILocalItemSource` implementation
//! - [`IdempotencyFile`] - Per-driver record of already-pushed local ids

pub mod idempotency;
pub mod store;

pub use idempotency::IdempotencyFile;
pub use store::JsonLocalItemStore;
