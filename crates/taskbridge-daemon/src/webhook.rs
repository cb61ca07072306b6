//! Webhook invocation boundary
//!
//! A single-endpoint HTTP server through which external drivers invoke the
//! engine: push one item, register an externally materialized mapping, flip
//! completion, or read engine state. Authentication is a shared secret
//! carried in the `X-Auth-Token` header or the `token` query parameter;
//! requests failing it are rejected before any business logic runs.
//!
//! Every response is JSON with `success` and `timestamp` fields plus either
//! a `message` or an `error`. Nothing escapes unformatted.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::header::CONTENT_TYPE;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{HeaderMap, Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use taskbridge_core::domain::{
    DomainError, LocalId, MappingPatch, RemoteItemId, RemoteListId, RemoteTaskPatch, SyncedItem,
};
use taskbridge_core::ports::{IMappingStore, IRemoteTaskService};
use taskbridge_core::usecases::{CompletionSyncUseCase, PullNewItemsUseCase, PushNewItemsUseCase};

/// Header carrying the shared secret
const AUTH_HEADER: &str = "x-auth-token";

/// Engine handles the webhook dispatches into
pub struct WebhookState {
    /// Shared secret all requests must present
    pub auth_token: String,
    pub push: Arc<PushNewItemsUseCase>,
    pub completion: Arc<CompletionSyncUseCase>,
    pub pull: Arc<PullNewItemsUseCase>,
    pub store: Arc<dyn IMappingStore>,
    pub remote: Arc<dyn IRemoteTaskService>,
}

/// HTTP server exposing the invocation boundary on a configurable endpoint.
pub struct WebhookServer {
    state: Arc<WebhookState>,
    addr: SocketAddr,
}

impl WebhookServer {
    /// Creates a new `WebhookServer`.
    ///
    /// # Arguments
    /// * `state` - Shared engine handles
    /// * `endpoint` - Address to bind, e.g. `"127.0.0.1:7878"`
    pub fn new(state: Arc<WebhookState>, endpoint: &str) -> Result<Self> {
        let addr: SocketAddr = endpoint.parse()?;
        Ok(Self { state, addr })
    }

    /// Starts the HTTP server. This future runs until the provided
    /// cancellation token is triggered.
    ///
    /// Should be spawned as a background task.
    pub async fn run(&self, shutdown: tokio_util::sync::CancellationToken) -> Result<()> {
        let listener = TcpListener::bind(self.addr).await?;
        info!(addr = %self.addr, "Webhook server listening");

        loop {
            tokio::select! {
                result = listener.accept() => {
                    let (stream, _) = result?;
                    let io = TokioIo::new(stream);
                    let state = Arc::clone(&self.state);

                    tokio::spawn(async move {
                        let service = service_fn(move |req| {
                            let state = Arc::clone(&state);
                            async move {
                                Ok::<_, std::convert::Infallible>(handle_request(req, state).await)
                            }
                        });

                        if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                            error!(error = %e, "Webhook HTTP connection error");
                        }
                    });
                }
                _ = shutdown.cancelled() => {
                    info!("Webhook server shutting down");
                    break;
                }
            }
        }

        Ok(())
    }
}

// ============================================================================
// Request routing
// ============================================================================

/// The operations selectable via the `action` query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    /// Default POST: push one item through the engine
    Push,
    /// Persist a mapping materialized by an external local driver
    Register,
    /// Flip completion for a mapped item (remote store and mapping)
    Complete,
    /// Enumerate pending completion divergences
    Divergences,
    /// Enumerate not-yet-mapped remote items
    Unmapped,
    /// Enumerate all mapping records
    Mappings,
}

/// Extracts a query parameter value by name
fn query_param<'a>(query: Option<&'a str>, name: &str) -> Option<&'a str> {
    query?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// Checks the shared secret against header and query parameter
fn is_authorized(headers: &HeaderMap, query: Option<&str>, expected: &str) -> bool {
    if expected.is_empty() {
        return false;
    }
    if let Some(value) = headers.get(AUTH_HEADER) {
        if value.to_str().map(|v| v == expected).unwrap_or(false) {
            return true;
        }
    }
    query_param(query, "token") == Some(expected)
}

/// Maps method and `action` parameter to an operation
///
/// Unknown actions are a client error regardless of method; known actions
/// with the wrong method are rejected as 405.
fn resolve_action(method: &Method, name: Option<&str>) -> Result<Action, (StatusCode, String)> {
    let (action, allowed) = match name {
        None | Some("") => (Action::Push, Method::POST),
        Some("register") => (Action::Register, Method::POST),
        Some("complete") => (Action::Complete, Method::POST),
        Some("divergences") => (Action::Divergences, Method::GET),
        Some("unmapped") => (Action::Unmapped, Method::GET),
        Some("mappings") => (Action::Mappings, Method::GET),
        Some(other) => {
            return Err((
                StatusCode::BAD_REQUEST,
                format!("Unknown action: {other}"),
            ))
        }
    };
    if *method != allowed {
        return Err((
            StatusCode::METHOD_NOT_ALLOWED,
            format!("Method {method} not allowed for this action"),
        ));
    }
    Ok(action)
}

// ============================================================================
// Response formatting
// ============================================================================

fn json_response(status: StatusCode, mut body: Map<String, Value>) -> Response<Full<Bytes>> {
    body.insert("success".into(), status.is_success().into());
    body.insert("timestamp".into(), Utc::now().to_rfc3339().into());
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(Value::Object(body).to_string())))
        .unwrap()
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response<Full<Bytes>> {
    let mut body = Map::new();
    body.insert("error".into(), message.into().into());
    json_response(status, body)
}

// ============================================================================
// Payloads
// ============================================================================

#[derive(Debug, Deserialize)]
struct PushPayload {
    local_id: Option<LocalId>,
    #[serde(default)]
    title: String,
    notes: Option<String>,
    due: Option<DateTime<Utc>>,
    list_name: Option<String>,
    #[serde(default)]
    force: bool,
}

#[derive(Debug, Deserialize)]
struct RegisterPayload {
    local_id: LocalId,
    remote_item_id: RemoteItemId,
    remote_list_id: RemoteListId,
    title: String,
    #[serde(default)]
    completed: bool,
}

#[derive(Debug, Deserialize)]
struct CompletePayload {
    local_id: LocalId,
    completed: bool,
    completed_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Handle a single HTTP request.
async fn handle_request(req: Request<Incoming>, state: Arc<WebhookState>) -> Response<Full<Bytes>> {
    let method = req.method().clone();
    let query = req.uri().query().map(str::to_string);

    if !is_authorized(req.headers(), query.as_deref(), &state.auth_token) {
        warn!(method = %method, "Webhook request rejected: bad or missing token");
        return error_response(StatusCode::UNAUTHORIZED, "Invalid or missing auth token");
    }

    let action = match resolve_action(&method, query_param(query.as_deref(), "action")) {
        Ok(action) => action,
        Err((status, message)) => return error_response(status, message),
    };

    let body = match req.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Failed to read request body: {e}"),
            )
        }
    };

    let result = match action {
        Action::Push => handle_push(&state, &body).await,
        Action::Register => handle_register(&state, &body).await,
        Action::Complete => handle_complete(&state, &body).await,
        Action::Divergences => handle_divergences(&state).await,
        Action::Unmapped => handle_unmapped(&state).await,
        Action::Mappings => handle_mappings(&state).await,
    };

    match result {
        Ok(response) => response,
        Err(e) => {
            // Domain-level rejections are the client's fault; anything else
            // is an internal failure.
            if let Some(domain) = e.downcast_ref::<DomainError>() {
                warn!(error = %domain, "Webhook request rejected");
                error_response(StatusCode::BAD_REQUEST, domain.to_string())
            } else {
                error!(error = %format!("{e:#}"), "Webhook request failed");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}"))
            }
        }
    }
}

fn parse_payload<'a, T: Deserialize<'a>>(body: &'a [u8]) -> Result<T, Response<Full<Bytes>>> {
    serde_json::from_slice(body)
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, format!("Invalid payload: {e}")))
}

async fn handle_push(state: &WebhookState, body: &[u8]) -> Result<Response<Full<Bytes>>> {
    let payload: PushPayload = match parse_payload(body) {
        Ok(payload) => payload,
        Err(response) => return Ok(response),
    };

    let item = taskbridge_core::domain::IncomingTask {
        local_id: payload.local_id,
        title: payload.title,
        notes: payload.notes,
        due: payload.due,
        list_name: payload.list_name,
    };

    let (local_id, outcome) = state.push.push_one(&item, payload.force).await?;

    let message = if outcome.is_created() {
        "Task created"
    } else if outcome.is_already_synced() {
        "Already synced"
    } else {
        "Task updated"
    };

    let mut response = Map::new();
    response.insert("message".into(), message.into());
    response.insert("local_id".into(), local_id.to_string().into());
    response.insert("result".into(), serde_json::to_value(&outcome)?);
    Ok(json_response(StatusCode::OK, response))
}

async fn handle_register(state: &WebhookState, body: &[u8]) -> Result<Response<Full<Bytes>>> {
    let payload: RegisterPayload = match parse_payload(body) {
        Ok(payload) => payload,
        Err(response) => return Ok(response),
    };

    let mapping = SyncedItem::new(
        payload.local_id.clone(),
        payload.remote_item_id,
        payload.remote_list_id,
        &payload.title,
        payload.completed,
    );
    state.store.put(&mapping).await?;
    info!(local_id = %payload.local_id, "Mapping registered via webhook");

    let mut response = Map::new();
    response.insert("message".into(), "Mapping registered".into());
    response.insert("local_id".into(), payload.local_id.to_string().into());
    Ok(json_response(StatusCode::OK, response))
}

async fn handle_complete(state: &WebhookState, body: &[u8]) -> Result<Response<Full<Bytes>>> {
    let payload: CompletePayload = match parse_payload(body) {
        Ok(payload) => payload,
        Err(response) => return Ok(response),
    };

    let mapping = state
        .store
        .get(&payload.local_id)
        .await?
        .ok_or_else(|| DomainError::MappingNotFound(payload.local_id.to_string()))?;

    let list_id = mapping
        .remote_list_id()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Mapping {} has no remote list recorded", payload.local_id))?;

    state
        .remote
        .patch_task(
            &list_id,
            mapping.remote_item_id(),
            &RemoteTaskPatch::completion(payload.completed, payload.completed_at),
        )
        .await?;
    state
        .store
        .patch(
            &payload.local_id,
            &MappingPatch::new().with_completed(payload.completed),
        )
        .await?;
    info!(
        local_id = %payload.local_id,
        completed = payload.completed,
        "Completion updated via webhook"
    );

    let mut response = Map::new();
    response.insert("message".into(), "Completion updated".into());
    response.insert("local_id".into(), payload.local_id.to_string().into());
    response.insert("completed".into(), payload.completed.into());
    Ok(json_response(StatusCode::OK, response))
}

async fn handle_divergences(state: &WebhookState) -> Result<Response<Full<Bytes>>> {
    let divergences = state.completion.pending_divergences().await?;

    let mut response = Map::new();
    response.insert("message".into(), format!("{} divergences", divergences.len()).into());
    response.insert("divergences".into(), serde_json::to_value(&divergences)?);
    Ok(json_response(StatusCode::OK, response))
}

async fn handle_unmapped(state: &WebhookState) -> Result<Response<Full<Bytes>>> {
    let items = state.pull.unmapped_remote_items().await?;

    let mut response = Map::new();
    response.insert("message".into(), format!("{} unmapped items", items.len()).into());
    response.insert("items".into(), serde_json::to_value(&items)?);
    Ok(json_response(StatusCode::OK, response))
}

async fn handle_mappings(state: &WebhookState) -> Result<Response<Full<Bytes>>> {
    let mappings = state.store.get_all().await?;

    let mut response = Map::new();
    response.insert("message".into(), format!("{} mappings", mappings.len()).into());
    response.insert("mappings".into(), serde_json::to_value(&mappings)?);
    Ok(json_response(StatusCode::OK, response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::HeaderValue;

    #[test]
    fn test_query_param_extraction() {
        let query = Some("action=register&token=s3cret");
        assert_eq!(query_param(query, "action"), Some("register"));
        assert_eq!(query_param(query, "token"), Some("s3cret"));
        assert_eq!(query_param(query, "missing"), None);
        assert_eq!(query_param(None, "action"), None);
    }

    #[test]
    fn test_authorization_via_header() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTH_HEADER, HeaderValue::from_static("s3cret"));
        assert!(is_authorized(&headers, None, "s3cret"));
        assert!(!is_authorized(&headers, None, "other"));
    }

    #[test]
    fn test_authorization_via_query_param() {
        let headers = HeaderMap::new();
        assert!(is_authorized(&headers, Some("token=s3cret"), "s3cret"));
        assert!(!is_authorized(&headers, Some("token=wrong"), "s3cret"));
        assert!(!is_authorized(&headers, None, "s3cret"));
    }

    #[test]
    fn test_empty_expected_token_rejects_everything() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTH_HEADER, HeaderValue::from_static(""));
        assert!(!is_authorized(&headers, Some("token="), ""));
    }

    #[test]
    fn test_default_action_is_push_on_post() {
        assert_eq!(resolve_action(&Method::POST, None).unwrap(), Action::Push);
        assert_eq!(
            resolve_action(&Method::POST, Some("")).unwrap(),
            Action::Push
        );
    }

    #[test]
    fn test_action_method_pairing() {
        assert_eq!(
            resolve_action(&Method::POST, Some("register")).unwrap(),
            Action::Register
        );
        assert_eq!(
            resolve_action(&Method::POST, Some("complete")).unwrap(),
            Action::Complete
        );
        assert_eq!(
            resolve_action(&Method::GET, Some("divergences")).unwrap(),
            Action::Divergences
        );
        assert_eq!(
            resolve_action(&Method::GET, Some("unmapped")).unwrap(),
            Action::Unmapped
        );
        assert_eq!(
            resolve_action(&Method::GET, Some("mappings")).unwrap(),
            Action::Mappings
        );
    }

    #[test]
    fn test_wrong_method_is_405() {
        let err = resolve_action(&Method::GET, None).unwrap_err();
        assert_eq!(err.0, StatusCode::METHOD_NOT_ALLOWED);

        let err = resolve_action(&Method::POST, Some("mappings")).unwrap_err();
        assert_eq!(err.0, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_unknown_action_is_400() {
        let err = resolve_action(&Method::POST, Some("destroy")).unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
        assert!(err.1.contains("destroy"));
    }

    #[test]
    fn test_response_envelope_fields() {
        let mut body = Map::new();
        body.insert("message".into(), "ok".into());
        let response = json_response(StatusCode::OK, body);
        assert_eq!(response.status(), StatusCode::OK);

        let response = error_response(StatusCode::UNAUTHORIZED, "nope");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_push_payload_defaults() {
        let payload: PushPayload = serde_json::from_str(r#"{"title": "Buy milk"}"#).unwrap();
        assert_eq!(payload.title, "Buy milk");
        assert!(payload.local_id.is_none());
        assert!(!payload.force);

        // A payload without a title parses; the engine rejects it later.
        let payload: PushPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.title.is_empty());
    }

    #[test]
    fn test_register_payload_requires_identities() {
        assert!(serde_json::from_str::<RegisterPayload>(r#"{"title": "x"}"#).is_err());

        let payload: RegisterPayload = serde_json::from_str(
            r#"{"local_id": "a1", "remote_item_id": "r1", "remote_list_id": "l1", "title": "x"}"#,
        )
        .unwrap();
        assert!(!payload.completed);
    }
}
