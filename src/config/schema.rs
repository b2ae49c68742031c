//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream API host the gateway forwards to.
    pub upstream: UpstreamConfig,

    /// Virtual key file location.
    pub keys: KeysConfig,

    /// Global admission ceiling.
    pub admission: AdmissionConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:48080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:48080".to_string(),
        }
    }
}

/// Upstream target configuration.
///
/// The host is a deployment constant, not a per-request routing decision.
/// The scheme is overridable so tests can stand up a cleartext double.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream authority (host, or host:port).
    pub host: String,

    /// URL scheme for the upstream ("https" in production).
    pub scheme: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            host: "api.openai.com".to_string(),
            scheme: "https".to_string(),
        }
    }
}

/// Virtual key configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct KeysConfig {
    /// Path to the virtual key file, one key per line.
    pub virtual_keys_file: String,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            virtual_keys_file: "virtual-api-keys.txt".to_string(),
        }
    }
}

/// Global admission ceiling configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AdmissionConfig {
    /// Maximum number of requests admitted over the process lifetime.
    /// `None` means unlimited.
    pub access_count_limit: Option<u64>,
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    /// Generous by default: upstream completions can stream for minutes.
    pub request_secs: u64,

    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 300,
            connect_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
