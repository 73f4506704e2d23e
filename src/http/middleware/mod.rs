//! Request middleware.

pub mod inbound_tracing;

pub use inbound_tracing::{
    extract_parent, inbound_tracing_middleware, HttpTracing, RequestTraceContext,
    trace_context,
};
