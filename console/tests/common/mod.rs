//! Local stand-in for the MAA backend used by integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::{json, Value};

/// A request as the backend saw it
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    /// Raw path, still percent-encoded
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: String,
}

impl Recorded {
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("request body is JSON")
    }
}

/// Canned responses keyed by method and raw path
#[derive(Clone, Default)]
pub struct Backend {
    routes: Arc<Mutex<HashMap<(Method, String), (StatusCode, String)>>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl Backend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, method: Method, path: &str, status: u16, body: impl Into<String>) {
        let status = StatusCode::from_u16(status).expect("valid status");
        self.routes
            .lock()
            .unwrap()
            .insert((method, path.to_string()), (status, body.into()));
    }

    pub fn respond_json(&self, method: Method, path: &str, body: Value) {
        self.respond(method, path, 200, body.to_string());
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// Serve on an ephemeral port and return the base URL
    pub async fn start(&self) -> String {
        let app = Router::new().fallback(handle).with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test backend");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve test backend");
        });
        format!("http://{}", addr)
    }
}

async fn handle(
    State(backend): State<Backend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    backend.requests.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    let route = backend
        .routes
        .lock()
        .unwrap()
        .get(&(method, uri.path().to_string()))
        .cloned();

    match route {
        Some((status, _)) if status == StatusCode::NO_CONTENT => status.into_response(),
        Some((status, body)) if status.is_success() => {
            (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
        }
        Some((status, body)) => (status, body).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub fn device_json(device_id: &str) -> Value {
    json!({
        "id": 1,
        "user_key": "demo-user",
        "device_id": device_id,
        "display_name": null,
        "status": "online",
        "agent_version": "0.1.0",
        "last_seen_at": "2025-01-01T12:00:00+00:00",
        "created_at": "2025-01-01T00:00:00+00:00",
        "updated_at": "2025-01-01T12:00:00+00:00"
    })
}

pub fn task_json(device_id: &str, task_type: &str, status: &str, params: Value) -> Value {
    json!({
        "id": 11,
        "task_uuid": "9b2e4f0c8a7d4e6f9a1b2c3d4e5f6a7b",
        "user_key": "demo-user",
        "device_identifier": device_id,
        "type": task_type,
        "payload": params,
        "status": status,
        "priority": 0,
        "created_at": "2025-01-01T12:00:00+00:00",
        "started_at": null,
        "finished_at": null,
        "log": null,
        "error_message": null
    })
}
