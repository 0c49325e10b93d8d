//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the mock
//! server. All types derive Serde traits for deserialization from TOML.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::routing::DuplicatePolicy;

/// Root configuration for the mock server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MockConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Route table and dispatch behavior.
    pub dispatch: DispatchConfig,

    /// Default simulated latency for fixture routes.
    pub latency: LatencyConfig,

    /// Timeout configuration for the HTTP front.
    pub timeouts: TimeoutConfig,

    /// HTTP front settings.
    pub http: HttpConfig,

    /// Admin endpoints.
    pub admin: AdminConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Fixed-response routes.
    pub routes: Vec<RouteConfig>,

    /// In-memory collections exposed as CRUD routes.
    pub resources: Vec<ResourceConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:3100").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3100".to_string(),
        }
    }
}

/// Dispatch configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Behavior on duplicate method + pattern registrations.
    pub duplicate_policy: DuplicatePolicy,

    /// Use the envelope code as the HTTP status when it is a valid status.
    /// Off by default: every envelope is delivered with HTTP 200.
    pub mirror_status: bool,
}

/// Simulated latency.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LatencyConfig {
    /// Base delay in milliseconds.
    pub default_ms: u64,

    /// Random extra delay, up to this many milliseconds.
    pub jitter_ms: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            default_ms: 300,
            jitter_ms: 0,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout for the HTTP front in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// HTTP front configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Answer CORS preflights permissively (browser dev servers).
    pub cors: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 2 * 1024 * 1024, // 2MB
            cors: true,
        }
    }
}

/// Admin endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Serve admin endpoints.
    pub enabled: bool,

    /// Path prefix for admin endpoints; never dispatched to mocks.
    pub prefix: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            prefix: "/__mock".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9100".to_string(),
        }
    }
}

/// A route answering with a fixed envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// HTTP method, case-insensitive.
    pub method: String,

    /// Route pattern, e.g. `/api/user/:id`.
    pub path: String,

    /// Envelope code (200 = success).
    #[serde(default = "default_code")]
    pub code: i32,

    /// Envelope message.
    #[serde(default = "default_message")]
    pub message: String,

    /// Envelope data.
    #[serde(default)]
    pub data: Value,

    /// Per-route latency override in milliseconds.
    #[serde(default)]
    pub latency_ms: Option<u64>,
}

fn default_code() -> i32 {
    200
}

fn default_message() -> String {
    "success".to_string()
}

/// An in-memory collection with CRUD routes under `base_path`.
///
/// On the list route, query keys other than `page` and `pageSize` filter by
/// string equality on the record field of that name. Keys that no record
/// carries are ignored, as are the values `""` and `"all"`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResourceConfig {
    /// Collection name in the data store.
    pub name: String,

    /// Route prefix, e.g. `/api/resources`.
    pub base_path: String,

    /// JSON file with seed records (array or `{ "list": [...] }`).
    #[serde(default)]
    pub seed_file: Option<String>,

    /// Inline seed records, used when no seed file is given.
    #[serde(default)]
    pub records: Vec<Value>,

    /// Fields that must be present and non-empty on create.
    #[serde(default)]
    pub required_fields: Vec<String>,

    /// Per-resource latency override in milliseconds.
    #[serde(default)]
    pub latency_ms: Option<u64>,
}
