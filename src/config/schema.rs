//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::entry::Filter;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Log core settings (file, rotation, webhooks).
    pub logging: LoggingConfig,

    /// Delivery worker settings.
    pub delivery: DeliveryConfig,

    /// HTTP surface settings.
    pub server: ServerConfig,

    /// Internal diagnostics and metrics.
    pub observability: ObservabilityConfig,
}

/// Log core configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Active log file path.
    pub log_file: String,

    /// Mirror every line to stdout.
    pub log_to_stdout: bool,

    /// Emit DEBUG entries (with call-site capture) from startup.
    pub debug: bool,

    /// Rotation policy for the active file.
    pub rotation: RotationConfig,

    /// Outbound webhook sinks registered at startup.
    pub webhooks: Vec<WebhookConfig>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_file: "logs/app.log".to_string(),
            log_to_stdout: true,
            debug: false,
            rotation: RotationConfig::default(),
            webhooks: Vec::new(),
        }
    }
}

/// Rotation limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RotationConfig {
    /// Maximum size of the active file in megabytes.
    pub max_size_mb: u64,

    /// Days to retain retired segments (0 = forever).
    pub max_age_days: u32,

    /// Number of retired segments to retain (0 = all).
    pub max_backups: usize,

    /// Gzip retired segments.
    pub compress: bool,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            max_size_mb: 10,
            max_age_days: 30,
            max_backups: 5,
            compress: true,
        }
    }
}

/// Outbound webhook sink definition.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct WebhookConfig {
    /// Target URL (entries are POSTed here).
    pub url: String,

    /// Sent in the `X-API-Key` header.
    #[serde(default)]
    pub api_key: String,

    /// Which entries this webhook receives.
    #[serde(default)]
    pub filter: Filter,
}

/// Delivery dispatcher configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Pending deliveries held before new ones are dropped.
    pub queue_capacity: usize,

    /// Maximum concurrent outbound deliveries.
    pub max_in_flight: usize,

    /// Per-delivery timeout in seconds.
    pub timeout_secs: u64,

    /// Time allowed to drain pending deliveries at shutdown.
    pub drain_timeout_secs: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            max_in_flight: 16,
            timeout_secs: 10,
            drain_timeout_secs: 5,
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 15,
            max_body_size: 1024 * 1024,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Level for internal diagnostics (trace, debug, info, warn, error).
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
