//! Integration tests for TokenManager refresh behavior

use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use taskbridge_remote::TokenManager;

use crate::common;

#[tokio::test]
async fn test_refresh_exchanges_refresh_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=test-refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "fresh-token",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let manager =
        TokenManager::with_token_url(&common::test_secrets(), format!("{}/token", server.uri()))
            .unwrap();

    let token = manager.access_token().await.unwrap();
    assert_eq!(token, "fresh-token");
}

#[tokio::test]
async fn test_access_token_is_cached_until_invalidated() {
    let server = MockServer::start().await;
    common::mount_token_endpoint(&server, "cached-token").await;

    let manager =
        TokenManager::with_token_url(&common::test_secrets(), format!("{}/token", server.uri()))
            .unwrap();

    manager.access_token().await.unwrap();
    manager.access_token().await.unwrap();
    assert_eq!(server.received_requests().await.unwrap().len(), 1);

    manager.invalidate().await;
    manager.access_token().await.unwrap();
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_refresh_failure_surfaces_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "invalid_grant"
        })))
        .mount(&server)
        .await;

    let manager =
        TokenManager::with_token_url(&common::test_secrets(), format!("{}/token", server.uri()))
            .unwrap();

    assert!(manager.access_token().await.is_err());
}
