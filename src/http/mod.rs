//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, admission gate, credential substitution)
//!     → request.rs (add request ID)
//!     → [forward to upstream API host]
//!     → response.rs (strip hop-by-hop headers, map gateway errors)
//!     → Stream to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestId, RequestIdLayer, X_REQUEST_ID};
pub use server::HttpServer;
