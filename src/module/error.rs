//! Module error types and result aliases.

use thiserror::Error;

/// Result type alias for module operations.
pub type ModuleResult<T> = Result<T, ModuleError>;

/// Errors that can occur during module lifecycle operations.
#[derive(Debug, Clone, Error)]
pub enum ModuleError {
    /// Module failed to initialize.
    #[error("initialization failed: {0}")]
    InitializationFailed(String),

    /// Module failed to start.
    #[error("start failed: {0}")]
    StartFailed(String),

    /// Module failed to stop gracefully.
    #[error("stop failed: {0}")]
    StopFailed(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Module is in an invalid state for the requested operation.
    #[error("invalid state: current={current}, expected={expected}")]
    InvalidState {
        /// Current state of the module.
        current: String,
        /// Expected state for the operation.
        expected: String,
    },

    /// Generic internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ModuleError::InvalidState {
            current: "running".to_string(),
            expected: "stopped".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid state: current=running, expected=stopped"
        );
    }

    #[test]
    fn test_module_result() {
        let ok: ModuleResult<u32> = Ok(1);
        assert!(ok.is_ok());

        let err: ModuleResult<u32> = Err(ModuleError::Internal("boom".to_string()));
        assert!(err.is_err());
    }
}
