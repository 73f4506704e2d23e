//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (thresholds > 0, batch size <= queue size)
//! - Check whitelist templates are absolute paths
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::AppConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("app.name must not be empty")]
    EmptyAppName,

    #[error("invalid listener address '{0}'")]
    InvalidBindAddress(String),

    #[error("whitelisted url '{0}' must start with '/'")]
    RelativeWhitelistPattern(String),

    #[error("otel threshold '{0}' must be greater than zero")]
    ZeroThreshold(&'static str),

    #[error("max_export_batch_size ({batch}) exceeds max_queue_size ({queue})")]
    BatchLargerThanQueue { batch: usize, queue: usize },

    #[error("trace exporter endpoint '{0}' is not a valid URL")]
    InvalidExporterEndpoint(String),

    #[error("timeout '{0}' must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.app.name.trim().is_empty() {
        errors.push(ValidationError::EmptyAppName);
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }
    if config.timeouts.outbound_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("outbound_secs"));
    }

    for pattern in &config.otel.server.http_tracing.whitelisted_urls {
        if !pattern.starts_with('/') {
            errors.push(ValidationError::RelativeWhitelistPattern(pattern.clone()));
        }
    }

    // Exporter settings only matter when something is exported
    if config.otel.server.enable {
        let t = &config.otel.server.thresholds;
        let positive = [
            ("concurrency_limit", t.concurrency_limit as u64),
            ("max_export_batch_size", t.max_export_batch_size as u64),
            ("scheduled_delay_millis", t.scheduled_delay_millis),
            ("export_timeout_millis", t.export_timeout_millis),
            ("max_queue_size", t.max_queue_size as u64),
        ];
        for (name, value) in positive {
            if value == 0 {
                errors.push(ValidationError::ZeroThreshold(name));
            }
        }

        if t.max_export_batch_size > t.max_queue_size {
            errors.push(ValidationError::BatchLargerThanQueue {
                batch: t.max_export_batch_size,
                queue: t.max_queue_size,
            });
        }

        let endpoint = &config.otel.observability.newrelic.trace_exporter_endpoint;
        if url::Url::parse(endpoint).is_err() {
            errors.push(ValidationError::InvalidExporterEndpoint(endpoint.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&AppConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = AppConfig::default();
        config.app.name = " ".into();
        config.listener.bind_address = "not-an-address".into();
        config.otel.server.http_tracing.whitelisted_urls = vec!["users/:id".into()];
        config.otel.server.thresholds.max_queue_size = 10;
        config.otel.server.thresholds.max_export_batch_size = 20;

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::EmptyAppName));
        assert!(errors.contains(&ValidationError::InvalidBindAddress("not-an-address".into())));
        assert!(errors.contains(&ValidationError::RelativeWhitelistPattern("users/:id".into())));
        assert!(errors.contains(&ValidationError::BatchLargerThanQueue { batch: 20, queue: 10 }));
    }

    #[test]
    fn test_thresholds_ignored_when_tracing_disabled() {
        let mut config = AppConfig::default();
        config.otel.server.enable = false;
        config.otel.server.thresholds.max_queue_size = 0;
        config.otel.observability.newrelic.trace_exporter_endpoint = "nope".into();

        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let mut config = AppConfig::default();
        config.otel.server.thresholds.scheduled_delay_millis = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::ZeroThreshold("scheduled_delay_millis")]);
    }
}
