//! Span identifiers and the span record itself.

use super::context::SpanContext;
use super::error::{TracingError, TracingResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// splitmix64 finalizer; spreads a weak seed over all 64 bits.
fn mix64(mut value: u64) -> u64 {
    value ^= value >> 30;
    value = value.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    value ^= value >> 27;
    value = value.wrapping_mul(0x94d0_49bb_1331_11eb);
    value ^ (value >> 31)
}

/// Wall-clock nanoseconds plus a process-wide sequence number.
///
/// Identifiers built from this pair are unique within a process and
/// practically unique across the processes a test run spawns. No `rand`
/// dependency is needed for that.
fn id_entropy() -> (u64, u64) {
    static SEQUENCE: AtomicU64 = AtomicU64::new(1);

    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64;
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);

    (nanos, seq.rotate_left(32) ^ u64::from(std::process::id()))
}

/// 128-bit trace identifier, rendered as 32 hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraceId(u128);

impl TraceId {
    /// Wrap a raw value.
    pub fn new(value: u128) -> Self {
        Self(value)
    }

    /// Generate a fresh trace identifier.
    pub fn generate() -> Self {
        let (nanos, salt) = id_entropy();
        Self((u128::from(nanos) << 64) | u128::from(mix64(nanos ^ salt)))
    }

    /// The all-zero sentinel.
    pub fn invalid() -> Self {
        Self(0)
    }

    /// Whether this identifier is non-zero.
    pub fn is_valid(&self) -> bool {
        self.0 != 0
    }

    /// Parse 32 hex characters.
    pub fn from_hex(hex: &str) -> TracingResult<Self> {
        if hex.len() != 32 {
            return Err(TracingError::InvalidTraceId(format!(
                "expected 32 hex chars, got {}",
                hex.len()
            )));
        }
        u128::from_str_radix(hex, 16)
            .map(Self)
            .map_err(|e| TracingError::InvalidTraceId(format!("invalid hex: {e}")))
    }

    /// Render as 32 hex characters.
    pub fn to_hex(&self) -> String {
        format!("{:032x}", self.0)
    }
}

impl fmt::Debug for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TraceId({})", self.to_hex())
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// 64-bit span identifier, rendered as 16 hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpanId(u64);

impl SpanId {
    /// Wrap a raw value.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Generate a fresh span identifier.
    pub fn generate() -> Self {
        let (nanos, salt) = id_entropy();
        Self(mix64(nanos.rotate_right(17) ^ salt))
    }

    /// The all-zero sentinel.
    pub fn invalid() -> Self {
        Self(0)
    }

    /// Whether this identifier is non-zero.
    pub fn is_valid(&self) -> bool {
        self.0 != 0
    }

    /// Parse 16 hex characters.
    pub fn from_hex(hex: &str) -> TracingResult<Self> {
        if hex.len() != 16 {
            return Err(TracingError::InvalidSpanId(format!(
                "expected 16 hex chars, got {}",
                hex.len()
            )));
        }
        u64::from_str_radix(hex, 16)
            .map(Self)
            .map_err(|e| TracingError::InvalidSpanId(format!("invalid hex: {e}")))
    }

    /// Render as 16 hex characters.
    pub fn to_hex(&self) -> String {
        format!("{:016x}", self.0)
    }
}

impl fmt::Debug for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SpanId({})", self.to_hex())
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Role a span plays in its trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpanKind {
    /// In-process operation (default).
    #[default]
    Internal,

    /// Server side of a network call.
    Server,

    /// Client side of a network call.
    Client,
}

impl SpanKind {
    /// Uppercase label used in exported span records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Internal => "INTERNAL",
            Self::Server => "SERVER",
            Self::Client => "CLIENT",
        }
    }
}

impl fmt::Display for SpanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A timed unit of work with parent linkage, kind, and attributes.
///
/// A span is owned and mutated only by the call frame that created it;
/// ending it hands it to the tracer for buffering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Span {
    /// Span name.
    pub name: String,

    /// Trace this span belongs to.
    pub trace_id: TraceId,

    /// Span identifier.
    pub span_id: SpanId,

    /// Parent linkage; the invalid context marks a root span.
    pub parent: SpanContext,

    /// Span kind.
    pub kind: SpanKind,

    /// Start time.
    pub start_time: DateTime<Utc>,

    /// End time (`None` while active).
    pub end_time: Option<DateTime<Utc>>,

    /// Span attributes.
    pub attributes: HashMap<String, String>,
}

impl Span {
    /// Create a new span under the given parent context.
    pub fn new(
        name: impl Into<String>,
        trace_id: TraceId,
        parent: SpanContext,
        kind: SpanKind,
    ) -> Self {
        Self {
            name: name.into(),
            trace_id,
            span_id: SpanId::generate(),
            parent,
            kind,
            start_time: Utc::now(),
            end_time: None,
            attributes: HashMap::new(),
        }
    }

    /// The context identifying this span, for propagation and child creation.
    pub fn context(&self) -> SpanContext {
        SpanContext::new(self.trace_id, self.span_id)
    }

    /// Whether the parent linkage references a real span.
    pub fn parent_valid(&self) -> bool {
        self.parent.is_valid()
    }

    /// Whether the parent arrived over a network hop.
    pub fn parent_remote(&self) -> bool {
        self.parent.remote
    }

    /// Set an attribute (last write wins).
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Read an attribute.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(|v| v.as_str())
    }

    /// End the span. Ending an already-ended span is a no-op.
    pub fn end(&mut self) {
        if self.end_time.is_none() {
            self.end_time = Some(Utc::now());
        }
    }

    /// Whether the span has ended.
    pub fn is_ended(&self) -> bool {
        self.end_time.is_some()
    }

    /// Duration of the span, if ended.
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.end_time.map(|end| end - self.start_time)
    }
}
