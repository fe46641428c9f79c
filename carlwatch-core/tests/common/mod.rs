//! Shared helpers for carlwatch integration tests
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use carlwatch_core::config::HttpSettings;
use carlwatch_core::retry::RetryPolicy;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Feed body with one Tecno model
pub const TECNO_FEED: &str =
    r#"{"list":[{"brand":"Tecno","list":[{"list":[{"model":"Camon20"}]}]}]}"#;

pub const TELEGRAM_OK: &str = r#"{"ok":true}"#;

/// A request seen by the stub server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path plus query string
    pub path: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status: u16,
    pub body: String,
}

impl StubResponse {
    pub fn ok(body: &str) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: r#"{"ok":false}"#.to_string(),
        }
    }
}

impl IntoResponse for StubResponse {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status).unwrap();
        (status, [(header::CONTENT_TYPE, "application/json")], self.body).into_response()
    }
}

#[derive(Clone)]
struct StubState {
    feed: StubResponse,
    send_message: StubResponse,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubState {
    fn record(&self, method: Method, uri: &Uri, body: String) {
        let path = uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| uri.path().to_string());
        self.requests.lock().unwrap().push(RecordedRequest {
            method: method.to_string(),
            path,
            body,
        });
    }
}

async fn serve_feed(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    body: String,
) -> StubResponse {
    state.record(method, &uri, body);
    state.feed.clone()
}

async fn serve_send_message(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    body: String,
) -> StubResponse {
    state.record(method, &uri, body);
    state.send_message.clone()
}

async fn not_found(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    body: String,
) -> StubResponse {
    state.record(method, &uri, body);
    StubResponse::status(404)
}

/// Carlcare feed at `/feed` and Telegram at `/bot<token>/sendMessage`.
/// Every request, matched or not, is recorded; unmatched paths get 404.
pub struct StubServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: tokio::task::JoinHandle<()>,
}

impl StubServer {
    pub async fn start(feed: StubResponse, send_message: StubResponse) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            feed,
            send_message,
            requests: requests.clone(),
        };

        let app = Router::new()
            .route("/feed", get(serve_feed))
            .route("/:bot/sendMessage", post(serve_send_message))
            .fallback(not_found)
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            let _ = server.await;
        });

        Self {
            addr,
            requests,
            shutdown_tx: Some(shutdown_tx),
            task,
        }
    }

    /// Feed only; Telegram calls get 404
    pub async fn feed(feed: StubResponse) -> Self {
        Self::start(feed, StubResponse::status(404)).await
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, prefix: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path.starts_with(prefix))
            .collect()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        self.task.abort();
    }
}

/// Short timeouts and near-zero backoff for tests
pub fn fast_http(max_retries: u32) -> HttpSettings {
    HttpSettings {
        timeout: Duration::from_secs(5),
        retry: RetryPolicy {
            max_retries,
            base_delay: Duration::from_millis(1),
        },
    }
}
