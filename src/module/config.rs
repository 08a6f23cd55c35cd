//! Deployment-time configuration overrides.

use std::collections::HashMap;

/// A single override value.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    /// Text value.
    String(String),

    /// Whole-number value.
    Integer(i64),

    /// Toggle value.
    Bool(bool),
}

/// Key-value overrides handed to a module during `init`.
///
/// Typed configuration lives with each module; this carries only what the
/// deployment wants to override at wiring time: ports, service identity,
/// feature toggles. Lookups are typed, and a key set with one type reads as
/// `None` under another.
#[derive(Debug, Clone, Default)]
pub struct ModuleConfig {
    values: HashMap<String, ConfigValue>,
}

impl ModuleConfig {
    /// No overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override with a string.
    pub fn set_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values
            .insert(key.into(), ConfigValue::String(value.into()));
    }

    /// Override with an integer.
    pub fn set_integer(&mut self, key: impl Into<String>, value: i64) {
        self.values.insert(key.into(), ConfigValue::Integer(value));
    }

    /// Override with a boolean.
    pub fn set_bool(&mut self, key: impl Into<String>, value: bool) {
        self.values.insert(key.into(), ConfigValue::Bool(value));
    }

    /// Read a string override.
    #[must_use]
    pub fn get_string(&self, key: &str) -> Option<&str> {
        if let Some(ConfigValue::String(value)) = self.values.get(key) {
            Some(value)
        } else {
            None
        }
    }

    /// Read an integer override.
    #[must_use]
    pub fn get_integer(&self, key: &str) -> Option<i64> {
        if let Some(ConfigValue::Integer(value)) = self.values.get(key) {
            Some(*value)
        } else {
            None
        }
    }

    /// Read a boolean override.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        if let Some(ConfigValue::Bool(value)) = self.values.get(key) {
            Some(*value)
        } else {
            None
        }
    }

    /// Whether any overrides are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
