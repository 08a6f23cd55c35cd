//! Span identity carried across call frames and network hops.

use super::span::{SpanId, TraceId};
use serde::{Deserialize, Serialize};

/// The identity of a span, small enough to capture by value.
///
/// Handlers copy the active span's context before hopping to another task,
/// so child spans stay correctly parented even after the original frame
/// completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanContext {
    /// Trace identifier.
    pub trace_id: TraceId,

    /// Span identifier.
    pub span_id: SpanId,

    /// Whether this identity arrived from another process.
    pub remote: bool,
}

impl SpanContext {
    /// Context for a locally created span.
    pub fn new(trace_id: TraceId, span_id: SpanId) -> Self {
        Self {
            trace_id,
            span_id,
            remote: false,
        }
    }

    /// The all-zero sentinel used as the parent of root spans.
    pub fn invalid() -> Self {
        Self::new(TraceId::invalid(), SpanId::invalid())
    }

    /// Both identifiers are non-zero.
    pub fn is_valid(&self) -> bool {
        self.trace_id.is_valid() && self.span_id.is_valid()
    }

    /// Flag the context as having crossed a process boundary.
    pub fn with_remote(mut self, remote: bool) -> Self {
        self.remote = remote;
        self
    }
}

impl Default for SpanContext {
    fn default() -> Self {
        Self::invalid()
    }
}
