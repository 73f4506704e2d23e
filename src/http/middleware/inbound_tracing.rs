//! Inbound HTTP tracing middleware.
//! Traces whitelisted requests as server spans.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Extensions, Request},
    middleware::Next,
    response::Response,
};
use opentelemetry::trace::{Span as _, SpanKind, Status, TraceContextExt, Tracer as _};
use opentelemetry::{Context, KeyValue};
use opentelemetry_sdk::trace::{SdkTracer, Span};

use crate::http::request::request_id;
use crate::observability::metrics;
use crate::observability::span::ATTR_HTTP_STATUS_CODE;
use crate::observability::{RequestDescriptor, SpanEnricher, TraceParent, TRACEPARENT_HEADER};

/// Decides which calls are traced and starts labeled spans for them.
#[derive(Debug, Clone)]
pub struct HttpTracing {
    tracer: SdkTracer,
    enricher: SpanEnricher,
}

impl HttpTracing {
    pub fn new(tracer: SdkTracer, enricher: SpanEnricher) -> Self {
        Self { tracer, enricher }
    }

    pub fn enricher(&self) -> &SpanEnricher {
        &self.enricher
    }

    /// Inbound calls are traced only when whitelisted; outbound calls always.
    pub fn should_trace(&self, request: &RequestDescriptor) -> bool {
        match request {
            RequestDescriptor::Inbound { path, .. } => self.enricher.whitelist().is_whitelisted(path),
            RequestDescriptor::Outbound { .. } => true,
        }
    }

    /// Start a span for `request` under `parent`, labeled at creation.
    ///
    /// The caller owns the returned span and must end it.
    pub fn start_span(&self, request: &RequestDescriptor, kind: SpanKind, parent: &Context) -> Span {
        let mut builder = self
            .tracer
            .span_builder(request.method().to_string())
            .with_kind(kind);
        self.enricher.enrich(&mut builder, request);
        builder.start_with_context(&self.tracer, parent)
    }
}

/// Trace context of the current inbound request, for handlers making
/// outbound calls.
#[derive(Debug, Clone, Default)]
pub struct RequestTraceContext(pub Context);

/// Trace context stored by the middleware, or an empty context when the
/// request was not traced.
pub fn trace_context(extensions: &Extensions) -> Context {
    extensions
        .get::<RequestTraceContext>()
        .map(|cx| cx.0.clone())
        .unwrap_or_default()
}

/// Parent context from an incoming `traceparent` header, if valid.
pub fn extract_parent<B>(req: &Request<B>) -> Context {
    req.headers()
        .get(TRACEPARENT_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| TraceParent::parse(v).ok())
        .map(|parent| parent.to_context())
        .unwrap_or_default()
}

pub async fn inbound_tracing_middleware(
    State(tracing): State<Arc<HttpTracing>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let descriptor = RequestDescriptor::inbound(
        Some(req.method().as_str()),
        req.uri().path_and_query().map(|pq| pq.as_str()),
    );

    // 1. Skip requests outside the whitelist
    if !tracing.should_trace(&descriptor) {
        metrics::record_trace_decision("skipped");
        return next.run(req).await;
    }
    metrics::record_trace_decision("traced");

    // 2. Start a labeled server span, continuing the caller's trace if any
    let parent = extract_parent(&req);
    let span = tracing.start_span(&descriptor, SpanKind::Server, &parent);

    ::tracing::debug!(
        request_id = %request_id(&req),
        path = %descriptor.path(),
        trace_id = %span.span_context().trace_id(),
        "Tracing inbound request"
    );

    let cx = parent.with_span(span);
    req.extensions_mut().insert(RequestTraceContext(cx.clone()));

    // 3. Run the handler, then record the outcome and close the span
    let response = next.run(req).await;
    let status = response.status();

    let span = cx.span();
    span.set_attribute(KeyValue::new(ATTR_HTTP_STATUS_CODE, status.as_u16() as i64));
    if status.is_server_error() {
        span.set_status(Status::error(status.to_string()));
    }
    span.end();

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::Whitelist;
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_sdk::trace::SdkTracerProvider;

    fn http_tracing(patterns: &[&str]) -> HttpTracing {
        let provider = SdkTracerProvider::builder().build();
        let whitelist = Arc::new(Whitelist::new(patterns.iter().copied(), ""));
        HttpTracing::new(provider.tracer("test"), SpanEnricher::new("svc", whitelist))
    }

    #[test]
    fn test_should_trace() {
        let tracing = http_tracing(&["/users/:id"]);

        assert!(tracing.should_trace(&RequestDescriptor::inbound(Some("GET"), Some("/users/1?x=y"))));
        assert!(!tracing.should_trace(&RequestDescriptor::inbound(Some("GET"), Some("/health"))));
        assert!(!tracing.should_trace(&RequestDescriptor::inbound(Some("GET"), None)));
        assert!(tracing.should_trace(&RequestDescriptor::outbound(Some("GET"), "h", None)));
    }

    #[test]
    fn test_extract_parent() {
        let req = Request::builder()
            .header(TRACEPARENT_HEADER, "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01")
            .body(Body::empty())
            .unwrap();
        let cx = extract_parent(&req);
        assert_eq!(
            cx.span().span_context().trace_id().to_string(),
            "4bf92f3577b34da6a3ce929d0e0e4736"
        );

        let malformed = Request::builder()
            .header(TRACEPARENT_HEADER, "bogus")
            .body(Body::empty())
            .unwrap();
        assert!(!extract_parent(&malformed).has_active_span());
    }
}
