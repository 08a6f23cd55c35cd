//! Configuration for span creation and export.

use serde::{Deserialize, Serialize};

/// Settings for the tracing module, loaded from the `[tracing]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracingConfig {
    /// Whether the module exposes a tracer at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Service name stamped on every exported span.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Service version stamped on every exported span.
    #[serde(default = "default_service_version")]
    pub service_version: String,

    /// Cap on spans retained in the export buffer.
    #[serde(default = "default_max_buffered_spans")]
    pub max_buffered_spans: usize,
}

fn default_enabled() -> bool {
    true
}

fn default_service_name() -> String {
    env!("CARGO_PKG_NAME").to_string()
}

fn default_service_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_max_buffered_spans() -> usize {
    4096
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            service_name: default_service_name(),
            service_version: default_service_version(),
            max_buffered_spans: default_max_buffered_spans(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TracingConfig::default();
        assert!(config.enabled);
        assert_eq!(config.service_name, env!("CARGO_PKG_NAME"));
        assert_eq!(config.max_buffered_spans, 4096);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: TracingConfig = toml::from_str("service_name = \"demo\"").unwrap();
        assert_eq!(config.service_name, "demo");
        assert!(config.enabled);
    }
}
