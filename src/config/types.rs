//! Top-level application configuration.

use crate::modules::http::config::HttpServerConfig;
use crate::modules::tracing::config::TracingConfig;
use serde::{Deserialize, Serialize};

/// Application configuration, loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server section.
    #[serde(default)]
    pub http: HttpServerConfig,

    /// Tracing section.
    #[serde(default)]
    pub tracing: TracingConfig,
}
