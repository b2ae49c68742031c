//! Bearer credential extraction and substitution.
//!
//! # Responsibilities
//! - Pull the bearer token out of the `Authorization` header
//! - Decide the effective outbound credential via the allow-list
//! - Keep the real upstream key out of logs and debug output

use std::collections::HashSet;

use axum::http::{header, HeaderMap};

/// Scheme prefix the gateway recognizes on the `Authorization` header.
const BEARER_PREFIX: &str = "Bearer ";

/// Result of the substitution decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Substitution<'a> {
    /// Presented key was allow-listed; the real key goes upstream.
    Replaced(&'a str),
    /// Presented key is unknown; it is forwarded unchanged and the upstream
    /// decides whether to accept it.
    Passthrough(&'a str),
}

impl<'a> Substitution<'a> {
    /// The credential that actually goes on the outbound request.
    pub fn effective(&self) -> &'a str {
        match self {
            Substitution::Replaced(key) | Substitution::Passthrough(key) => key,
        }
    }

    /// Whether the allow-list matched.
    pub fn matched(&self) -> bool {
        matches!(self, Substitution::Replaced(_))
    }
}

/// Immutable credential state shared by all request handlers.
///
/// Holds the virtual key allow-list and the single real upstream key.
/// Constructed once at startup; requires no locking afterwards.
pub struct CredentialStore {
    virtual_keys: HashSet<String>,
    real_key: String,
}

impl CredentialStore {
    pub fn new(virtual_keys: HashSet<String>, real_key: String) -> Self {
        Self {
            virtual_keys,
            real_key,
        }
    }

    /// Number of virtual keys loaded.
    pub fn virtual_key_count(&self) -> usize {
        self.virtual_keys.len()
    }

    /// Extract the bearer token from a request's headers.
    ///
    /// A missing header, a non-UTF-8 value, or any scheme other than
    /// `Bearer ` all yield the empty token. That is not an error: the empty
    /// token simply fails the allow-list lookup and passes through.
    pub fn bearer_token(headers: &HeaderMap) -> &str {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .unwrap_or("")
    }

    /// Decide the effective outbound credential for a presented token.
    pub fn substitute<'a>(&'a self, presented: &'a str) -> Substitution<'a> {
        if self.virtual_keys.contains(presented) {
            Substitution::Replaced(&self.real_key)
        } else {
            Substitution::Passthrough(presented)
        }
    }
}

// The real key must never appear in logs or panics.
impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("virtual_keys", &self.virtual_keys.len())
            .field("real_key", &"<redacted>")
            .finish()
    }
}
