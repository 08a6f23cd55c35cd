//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file does not exist.
    #[error("configuration file not found: {0}")]
    NotFound(PathBuf),

    /// Configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    ReadError {
        /// File path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// TOML parse error.
    #[error("failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation failure.
    #[error("configuration validation failed: {0}")]
    ValidationError(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = ConfigError::NotFound(PathBuf::from("/etc/arclight.toml"));
        assert!(err.to_string().contains("/etc/arclight.toml"));
    }
}
