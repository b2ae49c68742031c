//! Authenticating reverse-proxy gateway for the OpenAI API.
//!
//! Callers present virtual API keys; the gateway swaps allow-listed keys for
//! the real key, enforces a global access count ceiling, and relays
//! everything else to the upstream untouched.

pub mod admission;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use admission::{Admission, AdmissionGate};
pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use security::CredentialStore;
