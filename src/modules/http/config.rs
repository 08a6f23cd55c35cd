//! HTTP server configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpServerConfig {
    /// Address to bind.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Port to bind. Port 0 asks the OS for a free port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request size limits.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// IO timeouts.
    #[serde(default)]
    pub timeouts: TimeoutsConfig,

    /// Keep-alive behavior.
    #[serde(default)]
    pub keep_alive: KeepAliveConfig,

    /// Telemetry endpoint paths.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

fn default_bind_addr() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            limits: LimitsConfig::default(),
            timeouts: TimeoutsConfig::default(),
            keep_alive: KeepAliveConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum bytes for request head plus body.
    #[serde(default = "default_max_request_size")]
    pub max_request_size: usize,
}

fn default_max_request_size() -> usize {
    64 * 1024
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_request_size: default_max_request_size(),
        }
    }
}

/// IO timeouts, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutsConfig {
    /// Read timeout for a single request.
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

fn default_read_timeout_ms() -> u64 {
    30_000
}

impl TimeoutsConfig {
    /// Read timeout as a [`Duration`].
    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

/// Keep-alive behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeepAliveConfig {
    /// Whether connections may be reused.
    #[serde(default = "default_keep_alive_enabled")]
    pub enabled: bool,

    /// Maximum requests per connection.
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
}

fn default_keep_alive_enabled() -> bool {
    true
}

fn default_max_requests() -> u32 {
    100
}

impl Default for KeepAliveConfig {
    fn default() -> Self {
        Self {
            enabled: default_keep_alive_enabled(),
            max_requests: default_max_requests(),
        }
    }
}

/// Telemetry endpoint paths.
///
/// Requests to these paths are answered by the server itself and are not
/// traced; otherwise draining the export buffer would refill it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Path serving the export buffer as JSON.
    #[serde(default = "default_export_path")]
    pub export_path: String,

    /// Path clearing the export buffer.
    #[serde(default = "default_reset_path")]
    pub reset_path: String,
}

fn default_export_path() -> String {
    "/export".to_string()
}

fn default_reset_path() -> String {
    "/reset".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            export_path: default_export_path(),
            reset_path: default_reset_path(),
        }
    }
}
