//! The lifecycle contract every subsystem implements.
//!
//! The binary constructs each module, drives it through init and start,
//! watches status and metrics while it runs, and stops it on shutdown. The
//! contract keeps that wiring uniform across subsystems.

use super::{ModuleConfig, ModuleManifest, ModuleResult, ModuleStatus};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Point-in-time metrics snapshot reported by a module.
///
/// Counters only ever grow; gauges move both ways. Names are sorted so the
/// text rendering is stable across calls.
#[derive(Debug, Clone, Default)]
pub struct MetricsPayload {
    /// Monotonic counters.
    pub counters: BTreeMap<String, u64>,

    /// Instantaneous gauges.
    pub gauges: BTreeMap<String, f64>,
}

impl MetricsPayload {
    /// An empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a counter value.
    pub fn counter(&mut self, name: impl Into<String>, value: u64) {
        self.counters.insert(name.into(), value);
    }

    /// Record a gauge value.
    pub fn gauge(&mut self, name: impl Into<String>, value: f64) {
        self.gauges.insert(name.into(), value);
    }

    /// Render the snapshot in Prometheus text exposition format.
    #[must_use]
    pub fn to_prometheus(&self, prefix: &str) -> String {
        let mut text = String::new();
        for (name, value) in &self.counters {
            let _ = writeln!(text, "{prefix}_{name} {value}");
        }
        for (name, value) in &self.gauges {
            let _ = writeln!(text, "{prefix}_{name} {value}");
        }
        text
    }
}

/// The contract all Arclight modules implement.
///
/// Lifecycle order: `manifest` may be read at any time; `init` validates
/// configuration and acquires resources; `start` begins processing; `status`
/// and `metrics` are read while running; `stop` shuts down gracefully.
/// Implementations reject calls made out of order with
/// `ModuleError::InvalidState` rather than limping along.
pub trait ModuleContract: Send + Sync {
    /// The module's identity and declared capabilities.
    fn manifest(&self) -> ModuleManifest;

    /// Validate configuration overrides and acquire resources.
    ///
    /// Processing must not begin here; that is `start`'s job.
    ///
    /// # Errors
    ///
    /// `ModuleError::ConfigError` for bad configuration,
    /// `ModuleError::InitializationFailed` for failed resource acquisition,
    /// `ModuleError::InvalidState` unless the module is stopped.
    fn init(&mut self, config: ModuleConfig) -> ModuleResult<()>;

    /// Begin processing.
    ///
    /// # Errors
    ///
    /// `ModuleError::StartFailed` when processing cannot begin,
    /// `ModuleError::InvalidState` unless `init` ran first.
    fn start(&mut self) -> ModuleResult<()>;

    /// Shut down, finishing in-flight work and releasing resources.
    ///
    /// # Errors
    ///
    /// `ModuleError::StopFailed` when graceful shutdown is impossible.
    fn stop(&mut self) -> ModuleResult<()>;

    /// Current lifecycle state.
    fn status(&self) -> ModuleStatus;

    /// Current metrics snapshot.
    fn metrics(&self) -> MetricsPayload;

    /// Liveness probe; by default, whether the module is operational.
    fn heartbeat(&self) -> bool {
        self.status().is_operational()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_payload() {
        let mut payload = MetricsPayload::new();
        payload.counter("requests_total", 42);
        payload.gauge("active_connections", 3.0);

        assert_eq!(payload.counters.get("requests_total"), Some(&42));
        assert_eq!(payload.gauges.get("active_connections"), Some(&3.0));
    }

    #[test]
    fn test_prometheus_format() {
        let mut payload = MetricsPayload::new();
        payload.counter("spans_ended", 7);
        payload.counter("spans_started", 9);

        let text = payload.to_prometheus("arclight");
        assert_eq!(text, "arclight_spans_ended 7\narclight_spans_started 9\n");
    }
}
