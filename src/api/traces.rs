//! Relay of client-side traces to the observability platform.
//!
//! # Design Decisions
//! - One attempt per payload; the browser SDK batches and resends on its own
//! - The handler always answers 200 with `success` or `failure`

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{header, Request, StatusCode},
};
use opentelemetry::Context;
use serde_json::Value;
use thiserror::Error;

use crate::api::ErrorType;
use crate::http::client::ClientError;
use crate::http::middleware::trace_context;
use crate::http::server::AppState;
use crate::observability::metrics;

pub const API_KEY_HEADER: &str = "api-key";

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("failed to read payload: {0}")]
    Body(#[from] axum::Error),

    #[error("payload is not valid JSON: {0}")]
    Payload(#[from] serde_json::Error),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("platform answered {0}")]
    Status(StatusCode),
}

impl From<reqwest::Error> for RelayError {
    fn from(e: reqwest::Error) -> Self {
        RelayError::Client(ClientError::Request(e))
    }
}

pub async fn relay_traces(State(state): State<AppState>, request: Request<Body>) -> &'static str {
    let parent = trace_context(request.extensions());
    let limit = state.config.security.max_body_size;

    match forward(&state, &parent, request.into_body(), limit).await {
        Ok(()) => {
            metrics::record_trace_relay("success");
            "success"
        }
        Err(e) => {
            metrics::record_trace_relay("failure");
            tracing::error!(
                error_type = %ErrorType::ObservabilityExport,
                error = %e,
                "Failed to relay client traces"
            );
            "failure"
        }
    }
}

async fn forward(state: &AppState, parent: &Context, body: Body, limit: usize) -> Result<(), RelayError> {
    let bytes = to_bytes(body, limit).await?;
    let payload: Value = serde_json::from_slice(&bytes)?;

    let platform = &state.config.otel.observability.newrelic;
    let request = state
        .client
        .inner()
        .post(&platform.trace_exporter_endpoint)
        .header(API_KEY_HEADER, &platform.license_key)
        .header(header::CONTENT_TYPE, "application/json")
        .body(serde_json::to_vec(&payload)?)
        .build()?;

    let response = state.client.execute(parent, request).await?;
    let status = response.status();
    if !status.is_success() {
        return Err(RelayError::Status(status));
    }

    tracing::debug!(status = %status, "Client traces relayed");
    Ok(())
}
