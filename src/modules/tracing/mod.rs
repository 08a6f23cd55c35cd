//! # Distributed Tracing Module
//!
//! Span creation, trace context propagation, and span export for Arclight.
//!
//! ## Features
//!
//! - Server/Client/Internal span model with parent linkage
//! - W3C-style `traceparent` carrier propagation
//! - Graceful degradation on absent or malformed carriers
//! - Append-only export buffer with atomic reset

pub mod config;
pub mod context;
pub mod error;
pub mod export;
pub mod propagation;
pub mod span;
pub mod tracer;

pub use config::TracingConfig;
pub use context::SpanContext;
pub use error::{TracingError, TracingResult};
pub use export::{ExportBuffer, ExportedSpan, Resource};
pub use propagation::{Extractor, Injector, TraceContextPropagator};
pub use span::{Span, SpanId, SpanKind, TraceId};
pub use tracer::{TraceHandle, Tracer, TracerStats, TracingModule};
