//! Span export buffer and the flat export record format

use super::span::Span;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Mutex;
use tracing::warn;

/// Identity of the service producing spans.
#[derive(Debug, Clone)]
pub struct Resource {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,
}

impl Resource {
    /// SDK language reported in exported records
    pub const SDK_LANGUAGE: &'static str = "rust";

    /// SDK name reported in exported records
    pub const SDK_NAME: &'static str = env!("CARGO_PKG_NAME");

    /// SDK version reported in exported records
    pub const SDK_VERSION: &'static str = env!("CARGO_PKG_VERSION");

    /// Create a resource for the given service identity
    pub fn new(service_name: impl Into<String>, service_version: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            service_version: service_version.into(),
        }
    }
}

/// Append-only buffer of ended spans, retained until explicitly reset.
///
/// Appends from concurrent request tasks are serialized; `snapshot` and
/// `reset` observe a consistent state. The buffer is bounded: once full,
/// further spans are dropped with a warning rather than blocking request
/// handling.
#[derive(Debug)]
pub struct ExportBuffer {
    spans: Mutex<Vec<Span>>,
    max_spans: usize,
}

impl ExportBuffer {
    /// Create a buffer holding at most `max_spans` spans
    pub fn new(max_spans: usize) -> Self {
        Self {
            spans: Mutex::new(Vec::new()),
            max_spans,
        }
    }

    /// Append an ended span
    pub fn append(&self, span: Span) {
        let mut spans = match self.spans.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if spans.len() >= self.max_spans {
            warn!(name = %span.name, "export buffer full, dropping span");
            return;
        }

        spans.push(span);
    }

    /// Copy out the current contents in insertion order
    pub fn snapshot(&self) -> Vec<Span> {
        match self.spans.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of buffered spans
    pub fn len(&self) -> usize {
        match self.spans.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear the buffer all-or-nothing.
    ///
    /// Spans still in flight when reset is called will land in the buffer
    /// once they end; callers poll until the buffer stays empty.
    pub fn reset(&self) {
        let mut spans = match self.spans.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        spans.clear();
    }
}

/// Flat span record served by the export endpoint.
///
/// Span and resource attributes are flattened into prefixed keys
/// (`attr_http.method`, `resource_service.name`) so consumers can treat the
/// record as a single string map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedSpan {
    /// Span ID (hex)
    #[serde(rename = "spanId")]
    pub span_id: String,

    /// Parent span ID (hex, all-zero for roots)
    #[serde(rename = "parentSpanId")]
    pub parent_span_id: String,

    /// Trace ID (hex)
    #[serde(rename = "traceId")]
    pub trace_id: String,

    /// Span name
    pub name: String,

    /// Span kind label
    pub kind: String,

    /// Whether the span has ended
    pub ended: bool,

    /// Parent span ID from the parent linkage (hex)
    #[serde(rename = "parent_spanId")]
    pub parent_link_span_id: String,

    /// Parent trace ID from the parent linkage (hex)
    #[serde(rename = "parent_traceId")]
    pub parent_link_trace_id: String,

    /// Whether the parent linkage references a real span
    pub parent_valid: bool,

    /// Whether the parent arrived over a network hop
    pub parent_remote: bool,

    /// Flattened `attr_*` and `resource_*` keys
    #[serde(flatten)]
    pub attributes: BTreeMap<String, String>,
}

impl ExportedSpan {
    /// Build the flat record for a span produced under the given resource
    pub fn from_span(span: &Span, resource: &Resource) -> Self {
        let mut attributes = BTreeMap::new();

        for (key, value) in &span.attributes {
            attributes.insert(format!("attr_{key}"), value.clone());
        }

        attributes.insert(
            "resource_service.name".to_string(),
            resource.service_name.clone(),
        );
        attributes.insert(
            "resource_service.version".to_string(),
            resource.service_version.clone(),
        );
        attributes.insert(
            "resource_telemetry.sdk.language".to_string(),
            Resource::SDK_LANGUAGE.to_string(),
        );
        attributes.insert(
            "resource_telemetry.sdk.name".to_string(),
            Resource::SDK_NAME.to_string(),
        );
        attributes.insert(
            "resource_telemetry.sdk.version".to_string(),
            Resource::SDK_VERSION.to_string(),
        );

        Self {
            span_id: span.span_id.to_hex(),
            parent_span_id: span.parent.span_id.to_hex(),
            trace_id: span.trace_id.to_hex(),
            name: span.name.clone(),
            kind: span.kind.as_str().to_string(),
            ended: span.is_ended(),
            parent_link_span_id: span.parent.span_id.to_hex(),
            parent_link_trace_id: span.parent.trace_id.to_hex(),
            parent_valid: span.parent_valid(),
            parent_remote: span.parent_remote(),
            attributes,
        }
    }

    /// Read a flattened attribute or resource entry
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(|v| v.as_str())
    }
}
