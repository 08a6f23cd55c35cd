//! Per-request dispatch context.

use super::client::HttpClient;
use super::request::Request;
use crate::modules::router::route::PathParams;
use crate::modules::tracing::TraceHandle;

/// Everything a handler gets for one dispatched request.
///
/// The context is owned: the trace handle captures the active span's
/// identity by value, so handlers can hop to other tasks and still create
/// correctly parented child spans.
#[derive(Clone)]
pub struct RequestContext {
    /// The parsed request.
    pub request: Request,

    /// Path parameters extracted during resolution.
    pub params: PathParams,

    /// Trace handle for the active server span.
    pub trace: TraceHandle,

    /// Traced client for outbound calls.
    pub client: HttpClient,

    /// The authority (`host:port`) this server is reachable at, for
    /// loopback self-calls.
    pub local_authority: String,
}

impl RequestContext {
    /// A path parameter value.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// Absolute URL for a path on this server.
    #[must_use]
    pub fn local_url(&self, path: &str) -> String {
        format!("http://{}{}", self.local_authority, path)
    }
}
