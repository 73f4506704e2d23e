//! Distributed tracing support.
//!
//! # Responsibilities
//! - Build the OTLP/HTTP span exporter for the observability platform
//! - Configure the batch span processor from exporter thresholds
//! - Hand out the server tracer and flush spans on shutdown
//!
//! # Design Decisions
//! - Optional: nothing is exported when `otel.server.enable` is false
//! - The exporter, batching and queueing belong to the OpenTelemetry SDK;
//!   this module only threads configuration through

use std::collections::HashMap;
use std::time::Duration;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::{WithExportConfig, WithHttpConfig};
use opentelemetry_sdk::trace::{BatchConfig, BatchConfigBuilder, BatchSpanProcessor, SdkTracer, SdkTracerProvider};
use opentelemetry_sdk::Resource;
use thiserror::Error;

use crate::config::{ExporterThresholds, OtelConfig};

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to build span exporter: {0}")]
    Exporter(#[from] opentelemetry_otlp::ExporterBuildError),

    #[error("failed to shut down tracer provider: {0}")]
    Shutdown(String),
}

/// Owns the tracer provider for the lifetime of the server.
#[derive(Debug, Clone)]
pub struct Telemetry {
    provider: SdkTracerProvider,
    tracer: SdkTracer,
}

impl Telemetry {
    /// Wrap an existing provider; used by tests with in-memory exporters.
    pub fn from_provider(provider: SdkTracerProvider, app_name: &str) -> Self {
        let tracer = provider.tracer(tracer_name(app_name));
        Self { provider, tracer }
    }

    pub fn tracer(&self) -> &SdkTracer {
        &self.tracer
    }

    /// Flush pending spans and stop the exporter.
    pub fn shutdown(&self) -> Result<(), TelemetryError> {
        self.provider
            .shutdown()
            .map_err(|e| TelemetryError::Shutdown(e.to_string()))
    }
}

/// Set up span export, or return `None` when server tracing is disabled.
pub fn init_tracing(otel: &OtelConfig, app_name: &str) -> Result<Option<Telemetry>, TelemetryError> {
    if !otel.server.enable {
        tracing::info!("Server tracing disabled");
        return Ok(None);
    }

    let newrelic = &otel.observability.newrelic;
    let thresholds = &otel.server.thresholds;

    let mut headers = HashMap::new();
    headers.insert("api-key".to_string(), newrelic.license_key.clone());

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(newrelic.trace_exporter_endpoint.clone())
        .with_headers(headers)
        .with_timeout(Duration::from_millis(thresholds.export_timeout_millis))
        .build()?;

    let processor = BatchSpanProcessor::builder(exporter)
        .with_batch_config(batch_config(thresholds))
        .build();

    let provider = SdkTracerProvider::builder()
        .with_span_processor(processor)
        .with_resource(
            Resource::builder()
                .with_service_name(format!("{}-server", app_name))
                .build(),
        )
        .build();

    tracing::info!(
        app = %app_name,
        endpoint = %newrelic.trace_exporter_endpoint,
        max_queue_size = thresholds.max_queue_size,
        max_export_batch_size = thresholds.max_export_batch_size,
        "Tracing initialized for {} app", app_name
    );

    Ok(Some(Telemetry::from_provider(provider, app_name)))
}

/// Map configured thresholds onto the SDK batch settings.
pub fn batch_config(thresholds: &ExporterThresholds) -> BatchConfig {
    BatchConfigBuilder::default()
        .with_max_queue_size(thresholds.max_queue_size)
        .with_max_export_batch_size(thresholds.max_export_batch_size)
        .with_scheduled_delay(Duration::from_millis(thresholds.scheduled_delay_millis))
        .with_max_export_timeout(Duration::from_millis(thresholds.export_timeout_millis))
        .with_max_concurrent_exports(thresholds.concurrency_limit)
        .build()
}

fn tracer_name(app_name: &str) -> String {
    format!("{}-server-tracing", app_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_returns_none() {
        let mut otel = OtelConfig::default();
        otel.server.enable = false;
        assert!(init_tracing(&otel, "svc").unwrap().is_none());
    }

    #[test]
    fn test_tracer_name() {
        assert_eq!(tracer_name("svc"), "svc-server-tracing");
    }
}
