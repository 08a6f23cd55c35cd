//! Error types for the routing module.

use thiserror::Error;

/// Errors raised while building a route table.
#[derive(Debug, Error)]
pub enum RouterError {
    /// Path template could not be compiled.
    #[error("invalid template '{template}': {reason}")]
    InvalidTemplate {
        /// Offending template.
        template: String,
        /// Why compilation failed.
        reason: String,
    },

    /// Media type string could not be parsed.
    #[error("invalid media type: {0}")]
    InvalidMediaType(String),

    /// Route metadata violates an invariant.
    #[error("invalid route '{route}': {reason}")]
    InvalidRoute {
        /// Route template or name.
        route: String,
        /// Violated invariant.
        reason: String,
    },

    /// Two routes register the same method and template.
    #[error("conflicting routes for {method} {template}")]
    Conflict {
        /// HTTP method.
        method: String,
        /// Path template.
        template: String,
    },

    /// Two templates disagree on the parameter name at one position.
    #[error("conflicting template parameters at '{position}': {{{first}}} vs {{{second}}}")]
    ParamConflict {
        /// Path prefix where the conflict occurs.
        position: String,
        /// Previously registered parameter name.
        first: String,
        /// Newly registered parameter name.
        second: String,
    },

    /// Locator delegation revisits a route group.
    #[error("locator delegation cycle through group '{0}'")]
    DelegationCycle(String),

    /// Locator delegates to a group that was never registered.
    #[error("unknown route group '{0}'")]
    UnknownGroup(String),
}

/// Result type for route table construction.
pub type RouterResult<T> = Result<T, RouterError>;

/// Outcome of a failed route resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No route structurally matches the request.
    #[error("no route found for {method} {path}")]
    NotFound {
        /// HTTP method.
        method: String,
        /// Request path.
        path: String,
    },

    /// Routes matched structurally but none produces an acceptable media type.
    #[error("no acceptable representation for {path} (accept: {accept})")]
    NotAcceptable {
        /// Request path.
        path: String,
        /// Offered Accept header.
        accept: String,
    },

    /// Routes matched structurally but none consumes the request media type.
    #[error("unsupported media type '{content_type}' for {path}")]
    UnsupportedMedia {
        /// Request path.
        path: String,
        /// Offered Content-Type header.
        content_type: String,
    },
}
