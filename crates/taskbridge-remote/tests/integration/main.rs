//! Integration tests for taskbridge-remote
//!
//! Uses wiremock to simulate the task API and verifies end-to-end behavior
//! of the TasksClient, token refresh, and the RemoteTaskAdapter.

mod common;

mod test_adapter;
mod test_client;
mod test_token;
