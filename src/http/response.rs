//! Response handling and transformation.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers on both legs of the proxy
//! - Synthesize the gateway's own error responses
//!
//! # Design Decisions
//! - Upstream responses pass through otherwise untouched: no inspection,
//!   transformation, or caching of content
//! - Backend transport failures map to 502 Bad Gateway

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};

/// Hop-by-hop headers per RFC 7230 §6.1. These describe a single connection
/// and must not be forwarded by a proxy.
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Remove hop-by-hop headers, including any nominated by `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let nominated: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| name.trim().parse::<HeaderName>().ok())
        .collect();

    for name in nominated {
        headers.remove(&name);
    }
    for name in &HOP_BY_HOP {
        headers.remove(name);
    }
}

/// Response for requests rejected by the admission gate.
pub fn limit_exceeded() -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        "Total access count limit exceeded.\n",
    )
        .into_response()
}

/// Response for upstream transport failures.
pub fn bad_gateway() -> Response {
    (StatusCode::BAD_GATEWAY, "Upstream request failed\n").into_response()
}

/// Response for credentials that cannot be encoded into a header.
pub fn invalid_credential() -> Response {
    (StatusCode::BAD_REQUEST, "Invalid credential encoding\n").into_response()
}

/// Relay an upstream response verbatim, minus hop-by-hop headers.
///
/// The body is streamed; nothing is buffered here.
pub fn relay(status: StatusCode, mut headers: HeaderMap, body: Body) -> Response {
    strip_hop_by_hop(&mut headers);
    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
