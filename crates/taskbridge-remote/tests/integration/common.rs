//! Shared test helpers for task API integration tests
//!
//! Provides wiremock-based mock server setup. Each helper mounts the
//! necessary mock endpoints and returns an adapter or client pointing at the
//! mock server.

use std::sync::Arc;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use taskbridge_core::ports::ApiSecrets;
use taskbridge_remote::{RemoteTaskAdapter, TasksClient, TokenManager};

pub fn test_secrets() -> ApiSecrets {
    ApiSecrets {
        client_id: "test-client".to_string(),
        client_secret: "test-secret".to_string(),
        refresh_token: "test-refresh".to_string(),
    }
}

/// Mounts the OAuth token endpoint answering every refresh with the same
/// access token.
pub async fn mount_token_endpoint(server: &MockServer, access_token: &str) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": access_token,
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .mount(server)
        .await;
}

/// Sets up a mock server with a token endpoint and returns a
/// (MockServer, RemoteTaskAdapter) tuple pointing at it.
pub async fn setup_adapter() -> (MockServer, RemoteTaskAdapter) {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, "test-access-token").await;

    let tokens = TokenManager::with_token_url(&test_secrets(), format!("{}/token", server.uri()))
        .expect("build token manager");
    let client = TasksClient::with_base_url(server.uri()).expect("build client");
    let adapter = RemoteTaskAdapter::new(client, Arc::new(tokens));

    (server, adapter)
}

/// Mounts a single-page list collection
pub async fn mount_task_lists(server: &MockServer, lists: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/users/@me/lists"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "items": lists })),
        )
        .mount(server)
        .await;
}
