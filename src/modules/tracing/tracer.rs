//! Tracer: span creation, propagation, and export

use super::config::TracingConfig;
use super::context::SpanContext;
use super::export::{ExportBuffer, ExportedSpan, Resource};
use super::propagation::{Extractor, Injector, TraceContextPropagator};
use super::span::{Span, SpanKind, TraceId};
use crate::module::{
    Capability, MetricsPayload, ModuleConfig, ModuleContract, ModuleError, ModuleManifest,
    ModuleResult, ModuleStatus,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Process-wide tracer.
///
/// Constructed once at server startup and shared by reference with every
/// request-handling task. Spans are handed out by value and returned through
/// [`Tracer::finish`], which appends them to the export buffer.
pub struct Tracer {
    /// Service identity attached to exported spans
    resource: Resource,

    /// Carrier propagator
    propagator: TraceContextPropagator,

    /// Buffer of ended spans
    buffer: ExportBuffer,

    /// Statistics
    spans_started: AtomicU64,
    spans_ended: AtomicU64,
}

impl Tracer {
    /// Create a tracer with the given service identity and buffer capacity
    pub fn new(resource: Resource, max_buffered_spans: usize) -> Self {
        Self {
            resource,
            propagator: TraceContextPropagator::new(),
            buffer: ExportBuffer::new(max_buffered_spans),
            spans_started: AtomicU64::new(0),
            spans_ended: AtomicU64::new(0),
        }
    }

    /// Create a tracer from configuration
    pub fn from_config(config: &TracingConfig) -> Self {
        Self::new(
            Resource::new(&config.service_name, &config.service_version),
            config.max_buffered_spans,
        )
    }

    /// Service identity
    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    /// Extract a span context from a carrier
    pub fn extract<C: Extractor>(&self, carrier: &C) -> Option<SpanContext> {
        self.propagator.extract(carrier)
    }

    /// Inject a span context into a carrier
    pub fn inject<C: Injector>(&self, context: &SpanContext, carrier: &mut C) {
        self.propagator.inject(context, carrier);
    }

    /// Start a Server span for an inbound request.
    ///
    /// With a valid extracted parent the span joins the remote trace;
    /// otherwise it becomes the root of a new trace with the invalid parent
    /// sentinel.
    pub fn server_span(&self, name: impl Into<String>, parent: Option<SpanContext>) -> Span {
        let span = match parent.filter(SpanContext::is_valid) {
            Some(context) => Span::new(name, context.trace_id, context, SpanKind::Server),
            None => Span::new(
                name,
                TraceId::generate(),
                SpanContext::invalid(),
                SpanKind::Server,
            ),
        };
        self.spans_started.fetch_add(1, Ordering::Relaxed);
        span
    }

    /// Start a Client span for an outbound call and build its carrier.
    ///
    /// The returned header map carries the new span's context and is injected
    /// into the outbound request.
    pub fn client_span(
        &self,
        name: impl Into<String>,
        parent: &SpanContext,
    ) -> (Span, HashMap<String, String>) {
        let span = Span::new(name, parent.trace_id, *parent, SpanKind::Client);
        self.spans_started.fetch_add(1, Ordering::Relaxed);

        let mut carrier = HashMap::new();
        self.inject(&span.context(), &mut carrier);
        (span, carrier)
    }

    /// Start an Internal span under the given parent
    pub fn internal_span(&self, name: impl Into<String>, parent: &SpanContext) -> Span {
        self.spans_started.fetch_add(1, Ordering::Relaxed);
        Span::new(name, parent.trace_id, *parent, SpanKind::Internal)
    }

    /// End a span and append it to the export buffer.
    ///
    /// Ending is idempotent; a span already ended by its call frame keeps its
    /// original end timestamp.
    pub fn finish(&self, mut span: Span) {
        span.end();
        self.spans_ended.fetch_add(1, Ordering::Relaxed);
        self.buffer.append(span);
    }

    /// Snapshot the export buffer as flat records
    pub fn export(&self) -> Vec<ExportedSpan> {
        self.buffer
            .snapshot()
            .iter()
            .map(|span| ExportedSpan::from_span(span, &self.resource))
            .collect()
    }

    /// Number of buffered spans
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Clear the export buffer
    pub fn reset(&self) {
        self.buffer.reset();
    }

    /// Current statistics
    pub fn stats(&self) -> TracerStats {
        TracerStats {
            spans_started: self.spans_started.load(Ordering::Relaxed),
            spans_ended: self.spans_ended.load(Ordering::Relaxed),
            buffered: self.buffer.len() as u64,
        }
    }
}

/// Tracer statistics
#[derive(Debug, Clone, Default)]
pub struct TracerStats {
    /// Total spans started
    pub spans_started: u64,
    /// Total spans ended
    pub spans_ended: u64,
    /// Spans currently buffered for export
    pub buffered: u64,
}

/// Per-request trace handle.
///
/// Captures the tracer and the active span's context by value so child spans
/// remain correctly parented when the handler hops to another task.
#[derive(Clone)]
pub struct TraceHandle {
    tracer: Arc<Tracer>,
    context: SpanContext,
}

impl TraceHandle {
    /// Create a handle for the given active span context
    pub fn new(tracer: Arc<Tracer>, context: SpanContext) -> Self {
        Self { tracer, context }
    }

    /// The active span's context
    pub fn context(&self) -> SpanContext {
        self.context
    }

    /// The shared tracer
    pub fn tracer(&self) -> &Arc<Tracer> {
        &self.tracer
    }

    /// Start an Internal child span of the active span
    pub fn internal_span(&self, name: impl Into<String>) -> Span {
        self.tracer.internal_span(name, &self.context)
    }

    /// Start a Client child span and its outbound carrier
    pub fn client_span(&self, name: impl Into<String>) -> (Span, HashMap<String, String>) {
        self.tracer.client_span(name, &self.context)
    }

    /// Finish a span
    pub fn finish(&self, span: Span) {
        self.tracer.finish(span);
    }
}

/// Tracing module implementing the module contract.
pub struct TracingModule {
    /// Configuration
    config: TracingConfig,

    /// Module status
    status: ModuleStatus,

    /// Tracer instance, present while running
    tracer: Option<Arc<Tracer>>,
}

impl TracingModule {
    /// Create a tracing module
    pub fn new(config: TracingConfig) -> Self {
        Self {
            config,
            status: ModuleStatus::Stopped,
            tracer: None,
        }
    }

    /// The tracer, if the module is running with tracing enabled
    pub fn tracer(&self) -> Option<&Arc<Tracer>> {
        self.tracer.as_ref()
    }
}

impl Default for TracingModule {
    fn default() -> Self {
        Self::new(TracingConfig::default())
    }
}

impl ModuleContract for TracingModule {
    fn manifest(&self) -> ModuleManifest {
        ModuleManifest::builder("tracing")
            .description("Trace context propagation and span export")
            .version(1, 0, 0)
            .capability(Capability::TraceContextPropagation)
            .capability(Capability::SpanExport)
            .capability(Capability::Custom("W3CTraceContext".to_string()))
            .build()
    }

    fn init(&mut self, config: ModuleConfig) -> ModuleResult<()> {
        if self.status != ModuleStatus::Stopped {
            return Err(ModuleError::InvalidState {
                current: self.status.to_string(),
                expected: "stopped".to_string(),
            });
        }

        if let Some(name) = config.get_string("service_name") {
            self.config.service_name = name.to_string();
        }
        if let Some(version) = config.get_string("service_version") {
            self.config.service_version = version.to_string();
        }
        if let Some(enabled) = config.get_bool("enabled") {
            self.config.enabled = enabled;
        }

        if self.config.service_name.is_empty() {
            return Err(ModuleError::ConfigError(
                "service_name must not be empty".to_string(),
            ));
        }

        self.status = ModuleStatus::Initializing;
        Ok(())
    }

    fn start(&mut self) -> ModuleResult<()> {
        if self.status != ModuleStatus::Initializing {
            return Err(ModuleError::InvalidState {
                current: self.status.to_string(),
                expected: "initializing".to_string(),
            });
        }

        if self.config.enabled {
            self.tracer = Some(Arc::new(Tracer::from_config(&self.config)));
        }

        self.status = ModuleStatus::Running;
        Ok(())
    }

    fn stop(&mut self) -> ModuleResult<()> {
        if self.status != ModuleStatus::Running {
            return Err(ModuleError::InvalidState {
                current: self.status.to_string(),
                expected: "running".to_string(),
            });
        }

        if let Some(tracer) = &self.tracer {
            tracer.reset();
        }
        self.tracer = None;
        self.status = ModuleStatus::Stopped;
        Ok(())
    }

    fn status(&self) -> ModuleStatus {
        self.status.clone()
    }

    fn metrics(&self) -> MetricsPayload {
        let mut payload = MetricsPayload::new();

        if let Some(tracer) = &self.tracer {
            let stats = tracer.stats();
            payload.counter("spans_started", stats.spans_started);
            payload.counter("spans_ended", stats.spans_ended);
            payload.gauge("spans_buffered", stats.buffered as f64);
        }

        payload
    }
}
