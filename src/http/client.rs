//! Outbound HTTP client with trace propagation.
//!
//! # Responsibilities
//! - Trace every outbound call as a client span
//! - Inject the `traceparent` header so downstream spans join the trace
//! - Record the response status on the span
//!
//! # Design Decisions
//! - Outbound calls are never filtered by the whitelist
//! - Without tracing configured the client is a plain passthrough

use std::sync::Arc;

use axum::http::HeaderValue;
use opentelemetry::trace::{Span as _, SpanKind, Status};
use opentelemetry::{Context, KeyValue};
use thiserror::Error;

use crate::http::middleware::HttpTracing;
use crate::observability::span::ATTR_HTTP_STATUS_CODE;
use crate::observability::{RequestDescriptor, TraceParent, TRACEPARENT_HEADER};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("outbound request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// A `reqwest` client whose calls are traced.
#[derive(Debug, Clone)]
pub struct TracedClient {
    inner: reqwest::Client,
    tracing: Option<Arc<HttpTracing>>,
}

impl TracedClient {
    pub fn new(inner: reqwest::Client, tracing: Option<Arc<HttpTracing>>) -> Self {
        Self { inner, tracing }
    }

    /// The underlying client, for building requests.
    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }

    /// Send `request` as a child of `parent`.
    pub async fn execute(
        &self,
        parent: &Context,
        mut request: reqwest::Request,
    ) -> Result<reqwest::Response, ClientError> {
        let Some(tracing) = &self.tracing else {
            return Ok(self.inner.execute(request).await?);
        };

        let descriptor = describe(&request);
        let mut span = tracing.start_span(&descriptor, SpanKind::Client, parent);

        let traceparent = TraceParent::from_span_context(span.span_context());
        match HeaderValue::from_str(&traceparent.to_string()) {
            Ok(value) => {
                request.headers_mut().insert(TRACEPARENT_HEADER, value);
            }
            Err(e) => ::tracing::warn!(error = %e, "Failed to encode traceparent header"),
        }

        let result = self.inner.execute(request).await;
        match &result {
            Ok(response) => {
                let status = response.status();
                span.set_attribute(KeyValue::new(ATTR_HTTP_STATUS_CODE, status.as_u16() as i64));
                if status.is_server_error() {
                    span.set_status(Status::error(status.to_string()));
                }
            }
            Err(e) => span.set_status(Status::error(e.to_string())),
        }
        span.end();

        Ok(result?)
    }
}

/// Describe a request by host name and query-free path.
pub fn describe(request: &reqwest::Request) -> RequestDescriptor {
    let url = request.url();
    RequestDescriptor::outbound(
        Some(request.method().as_str()),
        url.host_str().unwrap_or_default(),
        Some(url.path()),
    )
}
