//! Theme data store subsystem.
//!
//! # Data Flow
//! ```text
//! assets/themes.json (startup)  /  PUT /api/themes (runtime)
//!     → data_store.rs (replace all entries)
//!     → GET /api/themes, /api/themes/{code}
//!     → theme.rs (typed view, CSS variable rendering)
//! ```
//!
//! # Design Decisions
//! - Content is one immutable map swapped atomically; readers never block
//! - Load replaces the whole content, there are no partial updates
//! - A missing seed file leaves the store empty rather than failing startup

pub mod data_store;
pub mod theme;

pub use data_store::{DataStore, StoreError};
pub use theme::{Theme, ThemeMeta};

/// Identifier of the theme store.
pub const THEME_STORE_ID: &str = "Data";
