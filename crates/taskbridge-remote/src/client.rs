//! Typed HTTP client for the cloud task API
//!
//! Wraps `reqwest::Client` with base-URL construction, bearer authentication
//! and JSON (de)serialization for the task API's wire format. Collection
//! endpoints are paginated with `pageToken`; the client follows all pages.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Base URL for the task API
const TASKS_BASE_URL: &str = "https://tasks.googleapis.com/tasks/v1";

/// Default per-request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Wire types
// ============================================================================

/// A task list as the API represents it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListResource {
    pub id: String,
    pub title: String,
}

/// A task as the API represents it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResource {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Due timestamp as RFC 3339
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
    /// `needsAction` or `completed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Completion timestamp as RFC 3339, present only when completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
}

/// One page of a collection response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Page<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    next_page_token: Option<String>,
}

// ============================================================================
// TasksClient
// ============================================================================

/// HTTP client for the task API
///
/// Holds no credentials; callers pass the current access token per call so
/// token refresh stays the concern of [`TokenManager`](crate::TokenManager).
pub struct TasksClient {
    client: Client,
    base_url: String,
}

impl TasksClient {
    /// Creates a client against the production base URL
    pub fn new() -> Result<Self> {
        Self::with_base_url(TASKS_BASE_URL)
    }

    /// Creates a client with a custom base URL (useful for testing)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Self::with_base_url_and_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Creates a client with a custom base URL and request timeout
    pub fn with_base_url_and_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Returns the base URL for API requests
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Creates an authenticated request builder for the given method and path
    fn request(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.request(method, &url).bearer_auth(token)
    }

    /// Lists all task lists, following pagination
    pub async fn list_task_lists(&self, token: &str) -> Result<Vec<TaskListResource>> {
        self.fetch_all_pages(token, "/users/@me/lists".to_string())
            .await
    }

    /// Creates a new task list with the given title
    pub async fn create_task_list(&self, token: &str, title: &str) -> Result<TaskListResource> {
        debug!(title, "Creating task list");
        self.request(Method::POST, "/users/@me/lists", token)
            .json(&serde_json::json!({ "title": title }))
            .send()
            .await
            .context("Failed to send list creation request")?
            .error_for_status()
            .context("List creation returned error status")?
            .json()
            .await
            .context("Failed to parse list creation response")
    }

    /// Lists tasks in a list, following pagination
    ///
    /// With `include_hidden` the API is asked for completed, hidden and
    /// deleted tasks as well; otherwise only open tasks are returned.
    pub async fn list_tasks(
        &self,
        token: &str,
        list_id: &str,
        include_hidden: bool,
    ) -> Result<Vec<TaskResource>> {
        let visibility = if include_hidden {
            "?showCompleted=true&showHidden=true&showDeleted=true"
        } else {
            "?showCompleted=false"
        };
        self.fetch_all_pages(token, format!("/lists/{list_id}/tasks{visibility}"))
            .await
    }

    /// Fetches a single task; `None` when the API answers 404
    pub async fn get_task(
        &self,
        token: &str,
        list_id: &str,
        task_id: &str,
    ) -> Result<Option<TaskResource>> {
        let response = self
            .request(Method::GET, &format!("/lists/{list_id}/tasks/{task_id}"), token)
            .send()
            .await
            .context("Failed to send task fetch request")?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(task_id, "Remote task not found");
            return Ok(None);
        }

        response
            .error_for_status()
            .context("Task fetch returned error status")?
            .json()
            .await
            .map(Some)
            .context("Failed to parse task fetch response")
    }

    /// Creates a task in the given list
    pub async fn insert_task(
        &self,
        token: &str,
        list_id: &str,
        task: &TaskResource,
    ) -> Result<TaskResource> {
        debug!(list_id, title = %task.title, "Creating task");
        self.request(Method::POST, &format!("/lists/{list_id}/tasks"), token)
            .json(task)
            .send()
            .await
            .context("Failed to send task creation request")?
            .error_for_status()
            .context("Task creation returned error status")?
            .json()
            .await
            .context("Failed to parse task creation response")
    }

    /// Partially updates a task; fields absent from `patch` are preserved
    pub async fn patch_task(
        &self,
        token: &str,
        list_id: &str,
        task_id: &str,
        patch: &serde_json::Value,
    ) -> Result<TaskResource> {
        debug!(list_id, task_id, "Patching task");
        self.request(
            Method::PATCH,
            &format!("/lists/{list_id}/tasks/{task_id}"),
            token,
        )
        .json(patch)
        .send()
        .await
        .context("Failed to send task patch request")?
        .error_for_status()
        .context("Task patch returned error status")?
        .json()
        .await
        .context("Failed to parse task patch response")
    }

    /// Deletes a task
    pub async fn delete_task(&self, token: &str, list_id: &str, task_id: &str) -> Result<()> {
        debug!(list_id, task_id, "Deleting task");
        self.request(
            Method::DELETE,
            &format!("/lists/{list_id}/tasks/{task_id}"),
            token,
        )
        .send()
        .await
        .context("Failed to send task deletion request")?
        .error_for_status()
        .context("Task deletion returned error status")?;
        Ok(())
    }

    /// Follows `nextPageToken` until the collection is exhausted
    async fn fetch_all_pages<T: serde::de::DeserializeOwned>(
        &self,
        token: &str,
        path: String,
    ) -> Result<Vec<T>> {
        let separator = if path.contains('?') { '&' } else { '?' };
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page_path = match &page_token {
                Some(t) => format!("{path}{separator}pageToken={t}"),
                None => path.clone(),
            };

            let page: Page<T> = self
                .request(Method::GET, &page_path, token)
                .send()
                .await
                .context("Failed to send collection request")?
                .error_for_status()
                .context("Collection request returned error status")?
                .json()
                .await
                .context("Failed to parse collection response")?;

            items.extend(page.items);
            match page.next_page_token {
                Some(t) if !t.is_empty() => page_token = Some(t),
                _ => return Ok(items),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_resource_deserialization() {
        let json = r#"{
            "id": "task-1",
            "title": "Buy milk",
            "status": "needsAction",
            "due": "2026-09-01T00:00:00.000Z"
        }"#;

        let task: TaskResource = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, "task-1");
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.status.as_deref(), Some("needsAction"));
        assert!(!task.deleted);
        assert!(!task.hidden);
    }

    #[test]
    fn test_task_resource_serialization_skips_empty_flags() {
        let task = TaskResource {
            title: "Buy milk".to_string(),
            status: Some("needsAction".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&task).unwrap();
        assert!(json.get("deleted").is_none());
        assert!(json.get("hidden").is_none());
        assert!(json.get("notes").is_none());
    }

    #[test]
    fn test_page_deserialization_without_items() {
        let page: Page<TaskResource> = serde_json::from_str("{}").unwrap();
        assert!(page.items.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn test_base_url_override() {
        let client = TasksClient::with_base_url("http://localhost:8080").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }
}
