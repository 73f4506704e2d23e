//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, compression, limits, request ID)
//! - Build the traced outbound client shared by handlers
//! - Bind server to listener and stop on shutdown
//!
//! # Layer order (outermost first)
//! ```text
//! set request id → propagate request id → trace log → metrics
//!     → body limit → gzip → inbound spans → timeout → handlers
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::Response,
    Router,
};
use opentelemetry_sdk::trace::SdkTracer;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::api;
use crate::config::AppConfig;
use crate::http::client::TracedClient;
use crate::http::compression::compression_layer;
use crate::http::middleware::{inbound_tracing_middleware, HttpTracing};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::observability::{metrics, SpanEnricher};
use crate::routing::Whitelist;
use crate::store::DataStore;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build outbound client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub themes: DataStore,
    pub client: TracedClient,
}

/// HTTP server for the application.
pub struct HttpServer {
    router: Router,
    config: Arc<AppConfig>,
}

impl HttpServer {
    /// Create the server. Spans are recorded only when a tracer is given.
    pub fn new(
        config: AppConfig,
        themes: DataStore,
        tracer: Option<SdkTracer>,
    ) -> Result<Self, ServerError> {
        let config = Arc::new(config);

        let tracing = tracer.map(|tracer| {
            let whitelist = Arc::new(Whitelist::new(
                config.otel.server.http_tracing.whitelisted_urls.iter().cloned(),
                &config.app.base_url,
            ));
            ::tracing::info!(
                patterns = whitelist.len(),
                base_path = %whitelist.base_path(),
                "HTTP tracing whitelist compiled"
            );
            Arc::new(HttpTracing::new(
                tracer,
                SpanEnricher::new(config.app.name.clone(), whitelist),
            ))
        });

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.outbound_secs))
            .build()?;

        let state = AppState {
            config: config.clone(),
            themes,
            client: TracedClient::new(client, tracing.clone()),
        };

        let router = Self::build_router(&config, state, tracing);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &AppConfig, state: AppState, tracing: Option<Arc<HttpTracing>>) -> Router {
        // Timeout sits inside the span so timed-out requests record their 408
        let mut router = api::router(state).layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.timeouts.request_secs),
        ));

        if let Some(tracing) = tracing {
            router = router.layer(middleware::from_fn_with_state(tracing, inbound_tracing_middleware));
        }
        if config.compression.enabled {
            router = router.layer(compression_layer());
        }

        router
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(middleware::from_fn(track_metrics))
            .layer(TraceLayer::new_for_http())
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for driving the app without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until a shutdown signal is broadcast.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        ::tracing::info!(
            address = %addr,
            app = %self.config.app.name,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                ::tracing::info!("Shutdown signal received");
            })
            .await?;

        ::tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

async fn track_metrics(req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let response = next.run(req).await;
    metrics::record_request(&method, response.status().as_u16(), start);
    response
}
