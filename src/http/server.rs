//! HTTP server setup and request forwarding.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all proxy handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Run the admission gate before any upstream work
//! - Substitute the bearer credential and rewrite the request for the
//!   upstream API host
//! - Stream the upstream response back verbatim
//!
//! # Design Decisions
//! - Admission is checked first: a rejected request performs no upstream I/O
//! - Bodies are streamed in both directions, never buffered
//! - Upstream failures surface as 502 with no retry

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, Request},
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::admission::AdmissionGate;
use crate::config::schema::UpstreamConfig;
use crate::config::GatewayConfig;
use crate::http::request::{RequestId, RequestIdLayer};
use crate::http::response;
use crate::observability::metrics;
use crate::security::CredentialStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<AdmissionGate>,
    pub credentials: Arc<CredentialStore>,
    pub client: reqwest::Client,
    pub upstream: UpstreamConfig,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and
    /// startup-loaded credential state.
    pub fn new(
        config: GatewayConfig,
        credentials: CredentialStore,
        gate: AdmissionGate,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()?;

        let state = AppState {
            gate: Arc::new(gate),
            credentials: Arc::new(credentials),
            client,
            upstream: config.upstream.clone(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.host,
            "HTTP server starting"
        );

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Main proxy handler.
/// Admits the request, substitutes the credential, and forwards upstream.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let start_time = Instant::now();
    let admission = state.gate.admit();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .cloned()
        .unwrap_or_else(|| RequestId("unknown".to_string()));

    let method = request.method().clone();
    let method_str = method.to_string();

    tracing::info!(
        ordinal = admission.ordinal,
        remote = %addr,
        request_id = %request_id,
        method = %method,
        path = request.uri().path(),
        "Request received"
    );

    if !admission.admitted {
        tracing::warn!(
            ordinal = admission.ordinal,
            limit = state.gate.ceiling(),
            "Total access count limit exceeded"
        );
        metrics::record_admission_rejected();
        metrics::record_request(&method_str, 422, start_time);
        return response::limit_exceeded();
    }

    let (parts, body) = request.into_parts();

    // Substitution decision. An absent or non-Bearer header presents the
    // empty token, which never matches the allow-list.
    let presented = CredentialStore::bearer_token(&parts.headers);
    let substitution = state.credentials.substitute(presented);
    if !substitution.matched() {
        tracing::warn!(
            ordinal = admission.ordinal,
            request_id = %request_id,
            "No virtual key matched; forwarding credential unchanged"
        );
        metrics::record_allowlist_miss();
    }

    let authorization = format!("Bearer {}", substitution.effective());
    let authorization = match header::HeaderValue::from_str(&authorization) {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(
                ordinal = admission.ordinal,
                request_id = %request_id,
                "Presented credential is not a valid header value"
            );
            metrics::record_request(&method_str, 400, start_time);
            return response::invalid_credential();
        }
    };

    // Rewrite: same method, path, query and body; only the target authority
    // and the Authorization header change. Host follows the upstream URL.
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let url = format!(
        "{}://{}{}",
        state.upstream.scheme, state.upstream.host, path_and_query
    );

    let mut headers = parts.headers.clone();
    response::strip_hop_by_hop(&mut headers);
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);
    headers.insert(header::AUTHORIZATION, authorization);

    let outbound = state
        .client
        .request(method, url)
        .headers(headers)
        .body(reqwest::Body::wrap_stream(body.into_data_stream()));

    match outbound.send().await {
        Ok(upstream) => {
            let status = upstream.status();
            tracing::debug!(
                ordinal = admission.ordinal,
                request_id = %request_id,
                status = %status,
                "Upstream responded"
            );
            metrics::record_request(&method_str, status.as_u16(), start_time);

            let headers = upstream.headers().clone();
            response::relay(status, headers, Body::from_stream(upstream.bytes_stream()))
        }
        Err(e) => {
            tracing::error!(
                ordinal = admission.ordinal,
                request_id = %request_id,
                error = %e,
                "Upstream error"
            );
            metrics::record_request(&method_str, 502, start_time);
            response::bad_gateway()
        }
    }
}
