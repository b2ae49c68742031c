//! Shared utilities for integration testing.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::any;
use axum::Router;
use tokio::net::TcpListener;

use keygate::admission::AdmissionGate;
use keygate::config::GatewayConfig;
use keygate::http::HttpServer;
use keygate::lifecycle::Shutdown;
use keygate::security::CredentialStore;

/// One request as observed by the mock upstream.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct CapturedRequest {
    pub method: String,
    pub uri: String,
    pub authorization: Option<String>,
    pub host: Option<String>,
    pub body: Vec<u8>,
}

/// Capturing stand-in for the upstream API host.
#[derive(Debug)]
pub struct MockUpstream {
    hits: AtomicUsize,
    requests: Mutex<Vec<CapturedRequest>>,
    /// Status code the mock answers with (default 200).
    pub response_status: AtomicU16,
}

impl Default for MockUpstream {
    fn default() -> Self {
        Self {
            hits: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            response_status: AtomicU16::new(200),
        }
    }
}

#[allow(dead_code)]
impl MockUpstream {
    pub fn hit_count(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CapturedRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

/// Start the capturing upstream double on an ephemeral port.
pub async fn start_mock_upstream() -> (SocketAddr, Arc<MockUpstream>) {
    let state = Arc::new(MockUpstream::default());
    let app = Router::new()
        .route("/", any(capture))
        .route("/{*path}", any(capture))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, state)
}

async fn capture(
    State(state): State<Arc<MockUpstream>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);

    let header_string = |name: header::HeaderName| {
        headers
            .get(&name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    state.requests.lock().unwrap().push(CapturedRequest {
        method: method.to_string(),
        uri: uri.to_string(),
        authorization: header_string(header::AUTHORIZATION),
        host: header_string(header::HOST),
        body: body.to_vec(),
    });

    let status = StatusCode::from_u16(state.response_status.load(Ordering::SeqCst))
        .unwrap_or(StatusCode::OK);
    (status, [("x-upstream", "mock")], "upstream ok")
}

/// Start a gateway on an ephemeral port, pointed at the given upstream.
///
/// The returned `Shutdown` must be held for the gateway's lifetime.
pub async fn start_gateway(
    upstream: SocketAddr,
    virtual_keys: &[&str],
    real_key: &str,
    access_count_limit: Option<u64>,
) -> (SocketAddr, Shutdown) {
    let mut config = GatewayConfig::default();
    config.upstream.host = upstream.to_string();
    config.upstream.scheme = "http".to_string();
    config.admission.access_count_limit = access_count_limit;

    let keys: HashSet<String> = virtual_keys.iter().map(|k| k.to_string()).collect();
    let credentials = CredentialStore::new(keys, real_key.to_string());
    let gate = AdmissionGate::new(access_count_limit);

    let server = HttpServer::new(config, credentials, gate).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (addr, shutdown)
}

/// Client with connection pooling disabled for test isolation.
pub fn test_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
