//! Configuration validation.

use super::types::AppConfig;

/// A single validation problem.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Configuration field path.
    pub field: String,
    /// Problem description.
    pub message: String,
}

/// Outcome of running a validator.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    errors: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Create a passing result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a problem.
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationIssue {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Whether validation passed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Recorded problems.
    #[must_use]
    pub fn errors(&self) -> &[ValidationIssue] {
        &self.errors
    }
}

/// Trait for configuration validators.
pub trait Validator: Send + Sync {
    /// Validate a configuration.
    fn validate(&self, config: &AppConfig) -> ValidationResult;
}

/// Baseline sanity checks applied to every loaded configuration.
#[derive(Debug, Default)]
pub struct BasicValidator;

impl BasicValidator {
    /// Create the validator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Validator for BasicValidator {
    fn validate(&self, config: &AppConfig) -> ValidationResult {
        let mut result = ValidationResult::new();

        if config.tracing.service_name.is_empty() {
            result.add_error("tracing.service_name", "must not be empty");
        }
        if config.tracing.max_buffered_spans == 0 {
            result.add_error("tracing.max_buffered_spans", "must be at least 1");
        }
        if config.http.limits.max_request_size == 0 {
            result.add_error("http.limits.max_request_size", "must be at least 1");
        }
        if !config.http.telemetry.export_path.starts_with('/') {
            result.add_error("http.telemetry.export_path", "must start with '/'");
        }
        if !config.http.telemetry.reset_path.starts_with('/') {
            result.add_error("http.telemetry.reset_path", "must start with '/'");
        }
        if config.http.telemetry.export_path == config.http.telemetry.reset_path {
            result.add_error("http.telemetry", "export and reset paths must differ");
        }

        result
    }
}
