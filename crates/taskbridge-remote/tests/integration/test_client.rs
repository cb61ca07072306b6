//! Integration tests for TasksClient wire handling

use wiremock::matchers::{bearer_token, body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use taskbridge_remote::TasksClient;

async fn client_against(server: &MockServer) -> TasksClient {
    TasksClient::with_base_url(server.uri()).expect("build client")
}

#[tokio::test]
async fn test_list_task_lists_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/@me/lists"))
        .and(bearer_token("tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [{"id": "l1", "title": "Reminders"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_against(&server).await;
    let lists = client.list_task_lists("tok").await.unwrap();

    assert_eq!(lists.len(), 1);
    assert_eq!(lists[0].id, "l1");
    assert_eq!(lists[0].title, "Reminders");
}

#[tokio::test]
async fn test_list_tasks_follows_pagination() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lists/l1/tasks"))
        .and(query_param("pageToken", "page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [{"id": "t2", "title": "Second"}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/lists/l1/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [{"id": "t1", "title": "First"}],
            "nextPageToken": "page2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_against(&server).await;
    let tasks = client.list_tasks("tok", "l1", false).await.unwrap();

    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].id, "t1");
    assert_eq!(tasks[1].id, "t2");
}

#[tokio::test]
async fn test_list_tasks_requests_full_visibility_when_hidden_included() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lists/l1/tasks"))
        .and(query_param("showCompleted", "true"))
        .and(query_param("showHidden", "true"))
        .and(query_param("showDeleted", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [{"id": "t1", "title": "Done", "status": "completed", "hidden": true}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_against(&server).await;
    let tasks = client.list_tasks("tok", "l1", true).await.unwrap();

    assert_eq!(tasks.len(), 1);
    assert!(tasks[0].hidden);
}

#[tokio::test]
async fn test_get_task_returns_none_on_404() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lists/l1/tasks/ghost"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_against(&server).await;
    assert!(client.get_task("tok", "l1", "ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn test_get_task_surfaces_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lists/l1/tasks/t1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_against(&server).await;
    assert!(client.get_task("tok", "l1", "t1").await.is_err());
}

#[tokio::test]
async fn test_insert_task_posts_wire_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/lists/l1/tasks"))
        .and(body_json(serde_json::json!({
            "title": "Buy milk",
            "status": "needsAction"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "t1",
            "title": "Buy milk",
            "status": "needsAction"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_against(&server).await;
    let created = client
        .insert_task(
            "tok",
            "l1",
            &taskbridge_remote::client::TaskResource {
                title: "Buy milk".to_string(),
                status: Some("needsAction".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(created.id, "t1");
}

#[tokio::test]
async fn test_patch_task_sends_partial_body() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/lists/l1/tasks/t1"))
        .and(body_json(serde_json::json!({"status": "completed", "completed": "2026-08-01T12:00:00+00:00"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "t1",
            "title": "Buy milk",
            "status": "completed",
            "completed": "2026-08-01T12:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_against(&server).await;
    let updated = client
        .patch_task(
            "tok",
            "l1",
            "t1",
            &serde_json::json!({"status": "completed", "completed": "2026-08-01T12:00:00+00:00"}),
        )
        .await
        .unwrap();

    assert_eq!(updated.status.as_deref(), Some("completed"));
}

#[tokio::test]
async fn test_delete_task() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/lists/l1/tasks/t1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_against(&server).await;
    client.delete_task("tok", "l1", "t1").await.unwrap();
}
