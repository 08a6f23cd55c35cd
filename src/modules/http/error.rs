//! Error types for the HTTP module.

use std::io;
use thiserror::Error;

/// Errors that can occur in HTTP handling.
#[derive(Debug, Error)]
pub enum HttpError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// HTTP parsing error.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid HTTP method.
    #[error("invalid method: {0}")]
    InvalidMethod(String),

    /// Invalid URI.
    #[error("invalid URI: {0}")]
    InvalidUri(String),

    /// Unrecognized protocol version on the request line.
    ///
    /// Carries the received token verbatim so the 501 reply can echo it.
    #[error("unsupported protocol version: {token}")]
    UnsupportedVersion {
        /// Version token as received, possibly malformed.
        token: String,
    },

    /// Request too large.
    #[error("request too large: {size} bytes (max: {max})")]
    RequestTooLarge {
        /// Actual size.
        size: usize,
        /// Maximum allowed.
        max: usize,
    },

    /// Timeout.
    #[error("timeout: {0}")]
    Timeout(String),

    /// Connection closed by the peer.
    #[error("connection closed")]
    ConnectionClosed,

    /// Malformed outbound URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Handler failure surfaced as a 500 response.
    #[error("handler error: {0}")]
    Handler(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for HTTP operations.
pub type HttpResult<T> = Result<T, HttpError>;

impl From<httparse::Error> for HttpError {
    fn from(err: httparse::Error) -> Self {
        HttpError::Parse(err.to_string())
    }
}

impl From<http::method::InvalidMethod> for HttpError {
    fn from(err: http::method::InvalidMethod) -> Self {
        HttpError::InvalidMethod(err.to_string())
    }
}

impl From<http::uri::InvalidUri> for HttpError {
    fn from(err: http::uri::InvalidUri) -> Self {
        HttpError::InvalidUri(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HttpError::UnsupportedVersion {
            token: "HTTP/50.0".to_string(),
        };
        assert_eq!(err.to_string(), "unsupported protocol version: HTTP/50.0");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::ConnectionRefused, "refused");
        let err = HttpError::from(io_err);
        assert!(matches!(err, HttpError::Io(_)));
    }

    #[test]
    fn test_request_too_large() {
        let err = HttpError::RequestTooLarge {
            size: 10_000_000,
            max: 1_000_000,
        };
        assert!(err.to_string().contains("10000000"));
    }
}
