//! Application API.
//!
//! # Routes
//! - `GET /health`: liveness and version
//! - `GET|PUT /api/themes`: read or replace the theme store
//! - `GET /api/themes/{code}`: one theme document
//! - `GET /api/themes/{code}/style`: theme CSS variables as a stylesheet
//! - `POST /api/traces`: relay client-side traces to the platform
//! - `GET /api/test-api`: slow, large response for load testing

pub mod error;
pub mod health;
pub mod test_api;
pub mod themes;
pub mod traces;

use axum::{
    routing::{get, post},
    Router,
};

use crate::http::server::AppState;

pub use error::ErrorType;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::get_health))
        .route("/api/themes", get(themes::list_themes).put(themes::replace_themes))
        .route("/api/themes/{code}", get(themes::get_theme))
        .route("/api/themes/{code}/style", get(themes::get_theme_style))
        .route("/api/traces", post(traces::relay_traces))
        .route("/api/test-api", get(test_api::test_api))
        .with_state(state)
}
