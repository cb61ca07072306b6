//! Integration tests for RemoteTaskAdapter
//!
//! Verifies domain-level behavior of the adapter against a mocked task API:
//! list memoization, find-or-create semantics, and wire-to-domain mapping.

use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use taskbridge_core::domain::{NewRemoteTask, RemoteItemId, RemoteListId, TaskStatus};
use taskbridge_core::ports::IRemoteTaskService;

use crate::common;

#[tokio::test]
async fn test_ensure_list_finds_existing_by_exact_name() {
    let (server, adapter) = common::setup_adapter().await;
    common::mount_task_lists(
        &server,
        serde_json::json!([
            {"id": "l1", "title": "Reminders"},
            {"id": "l2", "title": "Work"}
        ]),
    )
    .await;

    let list = adapter.ensure_list("Work").await.unwrap();

    assert_eq!(list.id.as_str(), "l2");
    assert_eq!(list.name, "Work");
}

#[tokio::test]
async fn test_ensure_list_creates_when_absent() {
    let (server, adapter) = common::setup_adapter().await;
    common::mount_task_lists(&server, serde_json::json!([])).await;
    Mock::given(method("POST"))
        .and(path("/users/@me/lists"))
        .and(body_json(serde_json::json!({"title": "Shopping"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "l-new",
            "title": "Shopping"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let list = adapter.ensure_list("Shopping").await.unwrap();

    assert_eq!(list.id.as_str(), "l-new");
}

#[tokio::test]
async fn test_ensure_list_memoizes_per_instance() {
    let (server, adapter) = common::setup_adapter().await;
    Mock::given(method("GET"))
        .and(path("/users/@me/lists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [{"id": "l1", "title": "Reminders"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let first = adapter.ensure_list("Reminders").await.unwrap();
    let second = adapter.ensure_list("Reminders").await.unwrap();

    assert_eq!(first.id, second.id);
}

#[tokio::test]
async fn test_list_tasks_maps_wire_fields() {
    let (server, adapter) = common::setup_adapter().await;
    Mock::given(method("GET"))
        .and(path("/lists/l1/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [
                {
                    "id": "t1",
                    "title": "Buy milk",
                    "notes": "2 liters",
                    "due": "2026-09-01T00:00:00Z",
                    "status": "needsAction"
                },
                {
                    "id": "t2",
                    "title": "Old chore",
                    "status": "completed",
                    "completed": "2026-08-01T09:30:00Z",
                    "deleted": true,
                    "hidden": true
                }
            ]
        })))
        .mount(&server)
        .await;

    let list_id = RemoteListId::new("l1".to_string()).unwrap();
    let tasks = adapter.list_tasks(&list_id, true).await.unwrap();

    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].title, "Buy milk");
    assert_eq!(tasks[0].notes.as_deref(), Some("2 liters"));
    assert_eq!(tasks[0].status, TaskStatus::NeedsAction);
    assert!(!tasks[0].deleted);
    assert!(tasks[1].is_completed());
    assert!(tasks[1].completed_at.is_some());
    assert!(tasks[1].deleted);
}

#[tokio::test]
async fn test_list_tasks_survives_malformed_due() {
    let (server, adapter) = common::setup_adapter().await;
    Mock::given(method("GET"))
        .and(path("/lists/l1/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [
                {
                    "id": "t1",
                    "title": "Broken due",
                    "due": "next tuesday",
                    "status": "needsAction"
                },
                {
                    "id": "t2",
                    "title": "Fine",
                    "due": "2026-09-01T00:00:00Z",
                    "status": "needsAction"
                }
            ]
        })))
        .mount(&server)
        .await;

    let list_id = RemoteListId::new("l1".to_string()).unwrap();
    let tasks = adapter.list_tasks(&list_id, true).await.unwrap();

    // The malformed timestamp loses the field, not the task (and not the list).
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].title, "Broken due");
    assert!(tasks[0].due.is_none());
    assert!(tasks[1].due.is_some());
}

#[tokio::test]
async fn test_get_task_none_on_remote_404() {
    let (server, adapter) = common::setup_adapter().await;
    Mock::given(method("GET"))
        .and(path("/lists/l1/tasks/ghost"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let list_id = RemoteListId::new("l1".to_string()).unwrap();
    let item_id = RemoteItemId::new("ghost".to_string()).unwrap();
    assert!(adapter.get_task(&list_id, &item_id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_insert_task_returns_domain_task() {
    let (server, adapter) = common::setup_adapter().await;
    Mock::given(method("POST"))
        .and(path("/lists/l1/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "t-created",
            "title": "Buy milk",
            "status": "needsAction"
        })))
        .mount(&server)
        .await;

    let list_id = RemoteListId::new("l1".to_string()).unwrap();
    let created = adapter
        .insert_task(
            &list_id,
            &NewRemoteTask {
                title: "Buy milk".to_string(),
                notes: None,
                due: None,
                status: TaskStatus::NeedsAction,
            },
        )
        .await
        .unwrap();

    assert_eq!(created.id.as_str(), "t-created");
    assert_eq!(created.list_id, list_id);
    assert_eq!(created.status, TaskStatus::NeedsAction);
}
