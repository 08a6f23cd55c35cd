//! Error types for the tracing module.

use thiserror::Error;

/// Errors raised while handling trace identity.
///
/// These stay internal to the propagation layer: a request carrying bad
/// trace identity still gets served, just under a fresh root trace.
#[derive(Debug, Error)]
pub enum TracingError {
    /// Trace identifier could not be parsed.
    #[error("invalid trace ID: {0}")]
    InvalidTraceId(String),

    /// Span identifier could not be parsed.
    #[error("invalid span ID: {0}")]
    InvalidSpanId(String),

    /// Carrier header is present but unusable.
    #[error("propagation error: {0}")]
    Propagation(String),
}

/// Result type for tracing operations.
pub type TracingResult<T> = Result<T, TracingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TracingError::InvalidTraceId("expected 32 hex chars".to_string());
        assert_eq!(err.to_string(), "invalid trace ID: expected 32 hex chars");

        let err = TracingError::Propagation("unsupported traceparent version '99'".to_string());
        assert!(err.to_string().starts_with("propagation error:"));
    }
}
