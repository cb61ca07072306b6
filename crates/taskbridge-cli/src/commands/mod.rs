//! CLI command implementations

pub mod auth;
pub mod completions;
pub mod config;
pub mod divergences;
pub mod mappings;
pub mod push;
pub mod sync;
