//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the app server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the application server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Application identity (name, base URL).
    pub app: AppIdentity,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// OpenTelemetry settings (exporter, thresholds, HTTP whitelist).
    pub otel: OtelConfig,

    /// Response compression settings.
    pub compression: CompressionConfig,

    /// Theme data store settings.
    pub themes: ThemesConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,

    /// Request size limits.
    pub security: SecurityConfig,
}

/// Application identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppIdentity {
    /// Application name, used in span names and the tracing resource.
    pub name: String,

    /// Base URL the app is mounted under. Only its path is used for matching.
    pub base_url: String,
}

impl Default for AppIdentity {
    fn default() -> Self {
        Self {
            name: "your-app-name".to_string(),
            base_url: "https://localhost:3000".to_string(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Timeout for outbound calls made by the server, in seconds.
    pub outbound_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            outbound_secs: 10,
        }
    }
}

/// OpenTelemetry configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct OtelConfig {
    /// Observability platform connection.
    pub observability: ObservabilityPlatformConfig,

    /// Server-side tracing.
    pub server: ServerTracingConfig,
}

/// Observability platform (trace sink) configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ObservabilityPlatformConfig {
    pub newrelic: NewRelicConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NewRelicConfig {
    /// OTLP/HTTP traces endpoint.
    pub trace_exporter_endpoint: String,

    /// License key sent as the `api-key` header.
    pub license_key: String,
}

impl Default for NewRelicConfig {
    fn default() -> Self {
        Self {
            trace_exporter_endpoint: "https://otlp.nr-data.net:4318/v1/traces".to_string(),
            // Placeholder; override with THEMEWEAVER_LICENSE_KEY.
            license_key: "YOUR_LICENSE_KEY".to_string(),
        }
    }
}

/// Server-side tracing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerTracingConfig {
    /// Enable span export for this server.
    pub enable: bool,

    /// Batch exporter thresholds.
    pub thresholds: ExporterThresholds,

    /// Which inbound HTTP requests get traced.
    pub http_tracing: HttpTracingConfig,
}

impl Default for ServerTracingConfig {
    fn default() -> Self {
        Self {
            enable: true,
            thresholds: ExporterThresholds::default(),
            http_tracing: HttpTracingConfig::default(),
        }
    }
}

/// Thresholds handed to the batch span processor.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExporterThresholds {
    /// Number of batches that may be exported concurrently.
    pub concurrency_limit: usize,

    /// Maximum spans per export. Must not exceed `max_queue_size`.
    pub max_export_batch_size: usize,

    /// Delay between two consecutive exports.
    pub scheduled_delay_millis: u64,

    /// How long an export may run before it is cancelled.
    pub export_timeout_millis: u64,

    /// Spans are dropped once the queue holds this many.
    pub max_queue_size: usize,
}

impl Default for ExporterThresholds {
    fn default() -> Self {
        Self {
            concurrency_limit: 30,
            max_export_batch_size: 512,
            scheduled_delay_millis: 5000,
            export_timeout_millis: 30000,
            max_queue_size: 2048,
        }
    }
}

/// Inbound HTTP tracing whitelist.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HttpTracingConfig {
    /// Path templates relative to the base URL; `:name` segments match anything.
    /// Order matters: the first matching template names the span.
    pub whitelisted_urls: Vec<String>,
}

/// Response compression configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// Enable gzip compression of response bodies.
    pub enabled: bool,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Theme data store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ThemesConfig {
    /// JSON file the store is seeded from at startup.
    pub path: String,
}

impl Default for ThemesConfig {
    fn default() -> Self {
        Self {
            path: "assets/themes.json".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.app.name, "your-app-name");
        assert!(config.otel.server.enable);
        assert_eq!(config.otel.server.thresholds.max_queue_size, 2048);
        assert!(config.otel.server.http_tracing.whitelisted_urls.is_empty());
    }

    #[test]
    fn test_nested_otel_sections() {
        let config: AppConfig = toml::from_str(
            r#"
            [app]
            name = "svc"
            base_url = "/api"

            [otel.server]
            enable = false

            [otel.server.thresholds]
            max_export_batch_size = 128

            [otel.server.http_tracing]
            whitelisted_urls = ["/users/:id", "/orders"]
            "#,
        )
        .unwrap();

        assert_eq!(config.app.name, "svc");
        assert!(!config.otel.server.enable);
        assert_eq!(config.otel.server.thresholds.max_export_batch_size, 128);
        // Untouched fields keep their defaults
        assert_eq!(config.otel.server.thresholds.scheduled_delay_millis, 5000);
        assert_eq!(
            config.otel.server.http_tracing.whitelisted_urls,
            vec!["/users/:id".to_string(), "/orders".to_string()]
        );
    }
}
