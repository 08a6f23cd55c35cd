//! Carrying trace identity across process boundaries.

use super::context::SpanContext;
use super::error::{TracingError, TracingResult};
use super::span::{SpanId, TraceId};
use std::collections::HashMap;

/// Read side of a carrier (e.g. inbound request headers).
pub trait Extractor {
    /// Get a value by key.
    fn get(&self, key: &str) -> Option<&str>;
}

/// Write side of a carrier (e.g. outbound request headers).
pub trait Injector {
    /// Set a value.
    fn set(&mut self, key: &str, value: String);
}

impl Extractor for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<&str> {
        HashMap::get(self, key).map(String::as_str)
    }
}

impl Injector for HashMap<String, String> {
    fn set(&mut self, key: &str, value: String) {
        self.insert(key.to_string(), value);
    }
}

/// W3C-style trace context propagator.
///
/// Trace identity travels in a single `traceparent` header,
/// `{version}-{trace-id}-{span-id}-{trace-flags}`. A carrier without a
/// usable header extracts to nothing and the receiving side starts a fresh
/// root trace; malformed identity never fails a request.
#[derive(Debug, Default)]
pub struct TraceContextPropagator;

impl TraceContextPropagator {
    /// Header name carrying the parent identity.
    pub const TRACEPARENT: &'static str = "traceparent";

    /// Create a propagator.
    pub fn new() -> Self {
        Self
    }

    /// Parse a traceparent header value.
    ///
    /// Example: `00-0af7651916cd43dd8448eb211c80319c-b7ad6b7169203331-01`.
    pub fn parse_traceparent(header: &str) -> TracingResult<(TraceId, SpanId)> {
        let mut fields = header.splitn(4, '-');
        let (Some(version), Some(trace_hex), Some(span_hex), Some(flags)) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(TracingError::Propagation(format!(
                "malformed traceparent '{header}'"
            )));
        };

        if version != "00" {
            return Err(TracingError::Propagation(format!(
                "unsupported traceparent version '{version}'"
            )));
        }

        let trace_id = TraceId::from_hex(trace_hex)?;
        let span_id = SpanId::from_hex(span_hex)?;

        if flags.len() != 2 || !flags.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(TracingError::Propagation(format!(
                "invalid trace flags '{flags}'"
            )));
        }

        Ok((trace_id, span_id))
    }

    /// Format a traceparent header value.
    pub fn format_traceparent(trace_id: &TraceId, span_id: &SpanId) -> String {
        format!("00-{}-{}-01", trace_id.to_hex(), span_id.to_hex())
    }

    /// Pull a span context out of a carrier.
    ///
    /// `None` when the header is absent, malformed, or carries the all-zero
    /// sentinel ids.
    pub fn extract(&self, carrier: &dyn Extractor) -> Option<SpanContext> {
        let header = carrier.get(Self::TRACEPARENT)?;
        let (trace_id, span_id) = Self::parse_traceparent(header).ok()?;

        let context = SpanContext::new(trace_id, span_id).with_remote(true);
        context.is_valid().then_some(context)
    }

    /// Write a span context into a carrier. Invalid contexts are skipped.
    pub fn inject(&self, context: &SpanContext, carrier: &mut dyn Injector) {
        if context.is_valid() {
            carrier.set(
                Self::TRACEPARENT,
                Self::format_traceparent(&context.trace_id, &context.span_id),
            );
        }
    }
}
