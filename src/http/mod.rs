//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (add request ID)
//!     → middleware/ (inbound span when whitelisted)
//!     → api handlers
//!     → compression.rs (gzip when accepted)
//!     → Send to client
//!
//! api handler → client.rs (outbound span, traceparent) → remote service
//! ```

pub mod client;
pub mod compression;
pub mod middleware;
pub mod request;
pub mod server;

pub use client::{ClientError, TracedClient};
pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer, ServerError};
