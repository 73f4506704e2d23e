//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use opentelemetry::Value;
use opentelemetry_sdk::trace::{InMemorySpanExporter, InMemorySpanExporterBuilder, SdkTracerProvider, SpanData};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use themeweaver::config::AppConfig;
use themeweaver::http::HttpServer;
use themeweaver::lifecycle::Shutdown;
use themeweaver::observability::Telemetry;
use themeweaver::store::{DataStore, THEME_STORE_ID};

pub const LICENSE_KEY: &str = "test-license";

/// Config with a small whitelist and `svc` as app name.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.app.name = "svc".to_string();
    config.app.base_url = "http://localhost:3000".to_string();
    config.otel.observability.newrelic.license_key = LICENSE_KEY.to_string();
    config.otel.server.http_tracing.whitelisted_urls = vec![
        "/api/themes".to_string(),
        "/api/themes/:code".to_string(),
        "/api/traces".to_string(),
    ];
    config
}

pub fn seeded_themes() -> DataStore {
    DataStore::load_from_file(THEME_STORE_ID, Path::new("assets/themes.json")).unwrap()
}

/// Server recording spans into memory.
pub fn build_server(config: AppConfig) -> (HttpServer, InMemorySpanExporter) {
    let exporter = InMemorySpanExporterBuilder::new().build();
    let provider = SdkTracerProvider::builder()
        .with_simple_exporter(exporter.clone())
        .build();
    let telemetry = Telemetry::from_provider(provider, "svc");

    let server = HttpServer::new(config, seeded_themes(), Some(telemetry.tracer().clone())).unwrap();
    (server, exporter)
}

pub struct TestApp {
    pub addr: SocketAddr,
    pub exporter: InMemorySpanExporter,
    pub shutdown: Shutdown,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn spans(&self) -> Vec<SpanData> {
        self.exporter.get_finished_spans().unwrap()
    }
}

/// Start the server on an ephemeral port.
pub async fn start_app(config: AppConfig) -> TestApp {
    let (server, exporter) = build_server(config);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let stop = shutdown.subscribe();
    tokio::spawn(server.run(listener, stop));

    TestApp { addr, exporter, shutdown }
}

/// A request received by the mock platform.
#[derive(Debug)]
pub struct CapturedRequest {
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[derive(Clone)]
struct MockPlatform {
    tx: mpsc::UnboundedSender<CapturedRequest>,
    status: StatusCode,
}

async fn capture(State(platform): State<MockPlatform>, headers: HeaderMap, body: Bytes) -> StatusCode {
    let _ = platform.tx.send(CapturedRequest { headers, body });
    platform.status
}

/// Start a mock observability platform answering `status` on `/v1/traces`.
pub async fn start_mock_platform(status: StatusCode) -> (SocketAddr, mpsc::UnboundedReceiver<CapturedRequest>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = Router::new()
        .route("/v1/traces", post(capture))
        .with_state(MockPlatform { tx, status });
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, rx)
}

pub fn attribute(span: &SpanData, key: &str) -> Option<Value> {
    span.attributes
        .iter()
        .find(|kv| kv.key.as_str() == key)
        .map(|kv| kv.value.clone())
}

pub fn string_attribute(span: &SpanData, key: &str) -> Option<String> {
    attribute(span, key).map(|v| v.as_str().into_owned())
}
