//! Throwaway HTTP server for exercising the client end to end.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

use crate::client::{Client, ClientOptions, API_KEY_HEADER};

/// Reply given to every request.
#[derive(Debug, Clone)]
pub(crate) struct Canned {
    status: u16,
    body: Option<Value>,
}

impl Canned {
    pub(crate) fn ok(body: Value) -> Self {
        Self::status(200, body)
    }

    pub(crate) fn status(status: u16, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    pub(crate) fn empty(status: u16) -> Self {
        Self { status, body: None }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Seen {
    pub method: String,
    /// Path plus query string.
    pub path: String,
    pub api_key: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Clone)]
struct Shared {
    canned: Canned,
    seen: Arc<Mutex<Vec<Seen>>>,
}

pub(crate) struct FakeServer {
    addr: SocketAddr,
    seen: Arc<Mutex<Vec<Seen>>>,
    handle: JoinHandle<()>,
}

impl FakeServer {
    pub(crate) async fn start(canned: Canned) -> Self {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new().fallback(record).with_state(Shared {
            canned,
            seen: seen.clone(),
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, seen, handle }
    }

    /// Client pointed at this server with retries disabled.
    pub(crate) fn client(&self, api_key: Option<&str>) -> Client {
        self.client_with_retries(api_key, 0)
    }

    pub(crate) fn client_with_retries(&self, api_key: Option<&str>, max_retries: u32) -> Client {
        Client::with_options(ClientOptions {
            base_url: format!("http://{}", self.addr),
            api_key: api_key.map(str::to_string),
            max_retries,
            ..ClientOptions::default()
        })
        .unwrap()
    }

    pub(crate) fn last(&self) -> Seen {
        self.seen.lock().unwrap().last().cloned().expect("no request seen")
    }

    pub(crate) fn count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

impl Drop for FakeServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn record(
    State(shared): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    shared.seen.lock().unwrap().push(Seen {
        method: method.to_string(),
        path: uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| uri.path().to_string()),
        api_key: header(API_KEY_HEADER),
        content_type: header(CONTENT_TYPE.as_str()),
        body: body.to_vec(),
    });

    let status = StatusCode::from_u16(shared.canned.status).unwrap();
    match &shared.canned.body {
        Some(body) => (status, [(CONTENT_TYPE, "application/json")], body.to_string()).into_response(),
        None => status.into_response(),
    }
}
