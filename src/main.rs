//! Themeweaver application server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ request id ─▶ inbound span ─▶ gzip ─▶ api ─┬─▶ theme store
//!                     (uuid)       (whitelisted    (accepted   │
//!                                   paths only)     encodings) └─▶ traced client ─▶ platform
//!                                                                  (traceparent)
//!
//!     Cross-cutting: config (TOML + env), logging, metrics, span export, shutdown
//! ```

use std::path::{Path, PathBuf};

use clap::Parser;
use tokio::net::TcpListener;

use themeweaver::config::{load_config, AppConfig};
use themeweaver::http::HttpServer;
use themeweaver::lifecycle::{wait_for_signal, Shutdown};
use themeweaver::observability::{init_tracing, logging, metrics};
use themeweaver::store::{DataStore, THEME_STORE_ID};

#[derive(Parser)]
#[command(name = "themeweaver")]
#[command(about = "Themeweaver application server", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    logging::init_logging(&config.observability.log_level);
    tracing::info!("themeweaver v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        app = %config.app.name,
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        tracing_enabled = config.otel.server.enable,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let telemetry = init_tracing(&config.otel, &config.app.name)?;

    let themes = match DataStore::load_from_file(THEME_STORE_ID, Path::new(&config.themes.path)) {
        Ok(store) => store,
        Err(e) => {
            tracing::warn!(path = ?config.themes.path, error = %e, "Theme data not loaded, starting empty");
            DataStore::new(THEME_STORE_ID)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, themes, telemetry.as_ref().map(|t| t.tracer().clone()))?;
    let stop = shutdown.subscribe();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        signal_shutdown.trigger();
    });

    server.run(listener, stop).await?;

    if let Some(telemetry) = telemetry {
        // Blocking flush; the server has drained by now
        if let Err(e) = tokio::task::spawn_blocking(move || telemetry.shutdown()).await? {
            tracing::error!(error = %e, "Failed to flush spans");
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
