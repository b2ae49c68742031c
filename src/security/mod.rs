//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → credentials.rs (extract bearer token, allow-list lookup)
//!     → effective credential chosen (real key or caller's own)
//!     → Pass to forwarder
//! ```
//!
//! # Design Decisions
//! - The real upstream key never leaves this module except on the outbound wire
//! - Unknown credentials are a policy miss, not a local rejection: the upstream's
//!   own authentication decision stays authoritative
//! - No trust in client input

pub mod credentials;

pub use credentials::{CredentialStore, Substitution};
