//! In-process fake of the help-desk REST API for tests.
//!
//! Every request is recorded; responses are scripted per `(method, path)` and
//! anything unscripted answers 404.

use crate::config::Config;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    /// `Value::Null` when the request had no JSON body.
    pub body: Value,
}

#[derive(Debug, Clone)]
struct Scripted {
    status: u16,
    body: String,
    delay: Option<Duration>,
}

#[derive(Clone, Default)]
struct MockState {
    routes: Arc<Mutex<HashMap<(String, String), Scripted>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub struct MockBackend {
    address: SocketAddr,
    state: MockState,
    handle: JoinHandle<()>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = MockState::default();
        let app = Router::new().fallback(serve_scripted).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend listener");
        let address = listener.local_addr().expect("mock backend local addr");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("run mock backend");
        });

        Self {
            address,
            state,
            handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.address)
    }

    /// Client configuration pointing at this backend.
    pub fn config(&self) -> Config {
        let base_url = self.base_url();
        Config::from_lookup(move |key| match key {
            "HELPDESK_API_BASE_URL" => Some(base_url.clone()),
            "HELPDESK_SESSION_FILE" => Some("/tmp/helpdesk-test-session.json".to_string()),
            _ => None,
        })
        .expect("mock backend config")
    }

    pub fn respond(&self, method: &str, path: &str, status: u16, body: Value) {
        self.script(method, path, status, body.to_string(), None);
    }

    pub fn respond_raw(&self, method: &str, path: &str, status: u16, body: &str) {
        self.script(method, path, status, body.to_string(), None);
    }

    pub fn respond_after(&self, delay: Duration, method: &str, path: &str, status: u16, body: Value) {
        self.script(method, path, status, body.to_string(), Some(delay));
    }

    fn script(&self, method: &str, path: &str, status: u16, body: String, delay: Option<Duration>) {
        self.state.routes.lock().expect("routes lock").insert(
            (method.to_ascii_uppercase(), path.to_string()),
            Scripted {
                status,
                body,
                delay,
            },
        );
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().expect("requests lock").clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.lock().expect("requests lock").len()
    }

    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.method == method && request.path == path)
            .collect()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve_scripted(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let recorded = RecordedRequest {
        method: method.as_str().to_string(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    };
    state.requests.lock().expect("requests lock").push(recorded);

    let scripted = state
        .routes
        .lock()
        .expect("routes lock")
        .get(&(method.as_str().to_string(), path))
        .cloned();

    let Some(scripted) = scripted else {
        return (StatusCode::NOT_FOUND, r#"{"detail":"Not found."}"#).into_response();
    };
    if let Some(delay) = scripted.delay {
        tokio::time::sleep(delay).await;
    }
    let status = StatusCode::from_u16(scripted.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        scripted.body,
    )
        .into_response()
}
