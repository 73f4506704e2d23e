//! Path whitelisting subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path (query already stripped)
//!     → whitelist.rs (ordered template scan)
//!     → matcher.rs (segment-wise comparison)
//!     → Return: matched template or NoMatch
//!
//! Whitelist Compilation (at startup):
//!     otel.server.http_tracing.whitelisted_urls
//!     → Parse templates into segments
//!     → Prefix with app base path
//!     → Freeze as immutable Whitelist
//! ```
//!
//! # Design Decisions
//! - Templates compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same template
//! - First match wins (configuration order)

pub mod matcher;
pub mod whitelist;

pub use matcher::{PathPattern, Segment};
pub use whitelist::{MatchResult, Whitelist};
