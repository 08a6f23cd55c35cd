//! Loading and validating TOML configuration files.

use super::error::{ConfigError, ConfigResult};
use super::types::AppConfig;
use super::validation::{BasicValidator, Validator};
use std::path::Path;
use tracing::info;

/// Loads [`AppConfig`] from disk and runs it past a validator chain.
#[derive(Default)]
pub struct ConfigLoader {
    validators: Vec<Box<dyn Validator>>,
}

impl ConfigLoader {
    /// A loader carrying the baseline validator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            validators: vec![Box::new(BasicValidator::new())],
        }
    }

    /// Append a validator to the chain.
    #[must_use]
    pub fn with_validator<V: Validator + 'static>(mut self, validator: V) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    /// Read and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Fails when the file is missing, unreadable, not valid TOML, or
    /// rejected by a validator.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> ConfigResult<AppConfig> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        self.load_str(&content)
    }

    /// Parse and validate a TOML document.
    pub fn load_str(&self, content: &str) -> ConfigResult<AppConfig> {
        let config: AppConfig = toml::from_str(content)?;
        self.validate(&config)?;
        Ok(config)
    }

    /// Like [`load`](Self::load), but a missing file yields validated
    /// defaults instead of an error.
    pub fn load_or_default<P: AsRef<Path>>(&self, path: P) -> ConfigResult<AppConfig> {
        let path = path.as_ref();
        if path.exists() {
            self.load(path)
        } else {
            info!(path = %path.display(), "no configuration file, using defaults");
            let config = AppConfig::default();
            self.validate(&config)?;
            Ok(config)
        }
    }

    fn validate(&self, config: &AppConfig) -> ConfigResult<()> {
        for validator in &self.validators {
            let outcome = validator.validate(config);
            if outcome.is_valid() {
                continue;
            }
            let problems: Vec<String> = outcome
                .errors()
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect();
            return Err(ConfigError::ValidationError(problems.join("; ")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_str() {
        let config = ConfigLoader::new()
            .load_str(
                r#"
                [http]
                port = 0

                [tracing]
                service_name = "integration-test"
                "#,
            )
            .unwrap();

        assert_eq!(config.http.port, 0);
        assert_eq!(config.tracing.service_name, "integration-test");
    }

    #[test]
    fn test_load_str_rejects_invalid() {
        let err = ConfigLoader::new()
            .load_str(
                r#"
                [tracing]
                service_name = ""
                "#,
            )
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_load_str_rejects_bad_toml() {
        let err = ConfigLoader::new().load_str("not valid = [").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[http]\nport = 9999").unwrap();

        let config = ConfigLoader::new().load(file.path()).unwrap();
        assert_eq!(config.http.port, 9999);
    }

    #[test]
    fn test_load_missing_file() {
        let err = ConfigLoader::new().load("/nonexistent/arclight.toml").unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_or_default() {
        let config = ConfigLoader::new()
            .load_or_default("/nonexistent/arclight.toml")
            .unwrap();
        assert_eq!(config.http.port, 8080);
    }
}
