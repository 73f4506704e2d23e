//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding the platform license key.
pub const ENV_LICENSE_KEY: &str = "THEMEWEAVER_LICENSE_KEY";

/// Environment variable overriding the trace exporter endpoint.
pub const ENV_EXPORTER_ENDPOINT: &str = "THEMEWEAVER_TRACE_EXPORTER_ENDPOINT";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
///
/// Secrets may be supplied through the environment instead of the file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    finalize(config, |key| std::env::var(key).ok())
}

/// Apply environment overrides to a config and validate the result.
pub fn finalize<F>(mut config: AppConfig, lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    apply_env_overrides(&mut config, lookup);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let newrelic = &mut config.otel.observability.newrelic;

    if let Some(key) = lookup(ENV_LICENSE_KEY).filter(|v| !v.is_empty()) {
        newrelic.license_key = key;
    }
    if let Some(endpoint) = lookup(ENV_EXPORTER_ENDPOINT).filter(|v| !v.is_empty()) {
        tracing::debug!(endpoint = %endpoint, "Trace exporter endpoint overridden from environment");
        newrelic.trace_exporter_endpoint = endpoint;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_overrides_secrets() {
        let config = finalize(AppConfig::default(), |key| match key {
            ENV_LICENSE_KEY => Some("secret".to_string()),
            ENV_EXPORTER_ENDPOINT => Some("http://collector:4318/v1/traces".to_string()),
            _ => None,
        })
        .unwrap();

        let newrelic = &config.otel.observability.newrelic;
        assert_eq!(newrelic.license_key, "secret");
        assert_eq!(newrelic.trace_exporter_endpoint, "http://collector:4318/v1/traces");
    }

    #[test]
    fn test_empty_override_is_ignored() {
        let config = finalize(AppConfig::default(), |_| Some(String::new())).unwrap();
        assert_eq!(config.otel.observability.newrelic.license_key, "YOUR_LICENSE_KEY");
    }

    #[test]
    fn test_invalid_file_reports_validation_errors() {
        let path = std::env::temp_dir().join("themeweaver_invalid_config.toml");
        fs::write(&path, "[app]\nname = \"\"\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref e) if e.contains(&ValidationError::EmptyAppName)));
        assert!(err.to_string().starts_with("Validation failed: app.name"));

        std::fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
