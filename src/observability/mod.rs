//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Intercepted HTTP call (inbound middleware / outbound client)
//!     → span.rs (descriptor → span name + http.* attributes)
//!     → propagation.rs (traceparent in / out)
//!     → tracing.rs (SDK provider → batch processor → OTLP exporter)
//!
//! All subsystems also produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//! ```
//!
//! # Design Decisions
//! - Span labeling is pure and never blocks request handling
//! - Request ID flows through logs alongside trace ids
//! - Tracing is optional to reduce overhead when not needed

pub mod logging;
pub mod metrics;
pub mod propagation;
pub mod span;
pub mod tracing;

pub use propagation::{TraceParent, TRACEPARENT_HEADER};
pub use span::{RequestDescriptor, SpanEnricher, SpanHandle, SpanLabel, UNKNOWN_METHOD};
pub use self::tracing::{init_tracing, Telemetry, TelemetryError};
