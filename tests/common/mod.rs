//! Shared fixtures: a fake credential broker and a fake calendar API, both
//! served by axum on random local ports.

#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use gcal_gateway::auth::{HttpCredentialBroker, TokenResolver};
use gcal_gateway::dispatch::{Dispatcher, ReqwestTransport};
use gcal_gateway::tools::builtin_catalog;
use gcal_gateway::types::{AuthConfig, BrokerConfig};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const API_KEY: &str = "test-key";

// =============================================================================
// Fake broker
// =============================================================================

#[derive(Debug, Default)]
pub struct BrokerState {
    /// caller → stored access token
    pub stored: Mutex<HashMap<String, String>>,
    /// caller → token handed out on refresh; absent means refresh fails
    pub refreshable: Mutex<HashMap<String, String>>,
    pub get_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub authorization_calls: AtomicUsize,
    pub requested_scopes: Mutex<Vec<String>>,
}

impl BrokerState {
    pub fn store(&self, caller: &str, token: &str) {
        self.stored
            .lock()
            .unwrap()
            .insert(caller.to_string(), token.to_string());
    }

    pub fn allow_refresh(&self, caller: &str, token: &str) {
        self.refreshable
            .lock()
            .unwrap()
            .insert(caller.to_string(), token.to_string());
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers.get("x-api-key").and_then(|v| v.to_str().ok()) == Some(API_KEY)
}

async fn broker_get_token(
    State(state): State<Arc<BrokerState>>,
    Path(caller): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    state.get_calls.fetch_add(1, Ordering::SeqCst);
    match state.stored.lock().unwrap().get(&caller) {
        Some(token) => Json(json!({"access_token": token, "expires_in": 3600})).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"error": "no token"}))).into_response(),
    }
}

async fn broker_refresh(
    State(state): State<Arc<BrokerState>>,
    Path(caller): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    let refreshed = state.refreshable.lock().unwrap().get(&caller).cloned();
    match refreshed {
        Some(token) => {
            state.store(&caller, &token);
            Json(json!({"access_token": token, "expires_in": 3600})).into_response()
        }
        None => (StatusCode::BAD_REQUEST, Json(json!({"error": "invalid_grant"}))).into_response(),
    }
}

async fn broker_authorize(
    State(state): State<Arc<BrokerState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    state.authorization_calls.fetch_add(1, Ordering::SeqCst);
    if let Some(scopes) = body["scopes"].as_array() {
        *state.requested_scopes.lock().unwrap() = scopes
            .iter()
            .filter_map(|s| s.as_str().map(str::to_string))
            .collect();
    }
    let caller = body["caller_id"].as_str().unwrap_or_default();
    Json(json!({"connect_url": format!("https://auth.example/connect/{}", caller)})).into_response()
}

// =============================================================================
// Fake calendar API
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub path_and_query: String,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

#[derive(Debug, Default)]
pub struct CalendarState {
    /// Bearer tokens the API accepts.
    pub accepted: Mutex<HashSet<String>>,
    pub requests: Mutex<Vec<RecordedRequest>>,
}

impl CalendarState {
    pub fn accept(&self, token: &str) {
        self.accepted.lock().unwrap().insert(token.to_string());
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn calendar_api(
    State(state): State<Arc<CalendarState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body: Option<Value> = serde_json::from_slice(&body).ok();
    let path = uri.path().to_string();
    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| path.clone());

    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.to_string(),
        path_and_query: path_and_query.clone(),
        authorization: authorization.clone(),
        body: body.clone(),
    });

    let token = authorization
        .as_deref()
        .and_then(|h| h.strip_prefix("Bearer "))
        .unwrap_or_default();
    if !state.accepted.lock().unwrap().contains(token) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": {"code": 401, "message": "Invalid Credentials"}})),
        )
            .into_response();
    }

    if method == Method::DELETE {
        return StatusCode::NO_CONTENT.into_response();
    }
    if path.ends_with("/events/missing") {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": {"code": 404, "message": "Not Found", "errors": [{"reason": "notFound"}]}})),
        )
            .into_response();
    }
    if method == Method::GET {
        if let Some((_, event_id)) = path.rsplit_once("/events/") {
            if !event_id.contains('/') {
                return Json(json!({"id": event_id, "summary": "Lunch"})).into_response();
            }
        }
    }
    Json(json!({"method": method.as_str(), "path": path_and_query, "body": body})).into_response()
}

// =============================================================================
// Harness
// =============================================================================

async fn spawn(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Address nothing is listening on.
pub async fn dead_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

pub struct TestEnv {
    pub broker: Arc<BrokerState>,
    pub calendar: Arc<CalendarState>,
    pub dispatcher: Arc<Dispatcher>,
}

impl TestEnv {
    pub async fn start() -> Self {
        let broker = Arc::new(BrokerState::default());
        let broker_router = Router::new()
            .route("/v1/connections/gcal/tokens/{caller}", get(broker_get_token))
            .route("/v1/connections/gcal/tokens/{caller}/refresh", post(broker_refresh))
            .route("/v1/connections/gcal/authorizations", post(broker_authorize))
            .with_state(broker.clone());
        let broker_addr = spawn(broker_router).await;

        let calendar = Arc::new(CalendarState::default());
        let calendar_router = Router::new()
            .fallback(calendar_api)
            .with_state(calendar.clone());
        let calendar_addr = spawn(calendar_router).await;

        let dispatcher = build_dispatcher(
            &format!("http://{}", broker_addr),
            &format!("http://{}/calendar/v3", calendar_addr),
        );

        Self {
            broker,
            calendar,
            dispatcher: Arc::new(dispatcher),
        }
    }
}

pub fn build_dispatcher(broker_url: &str, api_url: &str) -> Dispatcher {
    let catalog = Arc::new(builtin_catalog().unwrap());
    let broker = HttpCredentialBroker::new(&BrokerConfig {
        base_url: broker_url.to_string(),
        api_key: API_KEY.to_string(),
        connection: "gcal".to_string(),
        request_timeout: Duration::from_secs(2),
    })
    .unwrap();
    let resolver = TokenResolver::new(
        Arc::new(broker),
        &AuthConfig::default(),
        catalog.required_scopes(),
    );
    let transport = ReqwestTransport::new(Duration::from_secs(2)).unwrap();
    Dispatcher::new(catalog, resolver, Arc::new(transport), api_url).unwrap()
}
