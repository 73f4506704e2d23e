//! Theme store endpoints.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use crate::api::error::error_response;
use crate::http::server::AppState;
use crate::store::Theme;

pub async fn list_themes(State(state): State<AppState>) -> Json<Value> {
    Json(state.themes.get_data())
}

/// Replace the whole store with the posted object.
pub async fn replace_themes(State(state): State<AppState>, Json(data): Json<Value>) -> Response {
    match state.themes.load_value(data) {
        Ok(()) => {
            tracing::info!(store = state.themes.id(), entries = state.themes.len(), "Themes replaced");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => error_response(StatusCode::BAD_REQUEST, e.to_string()),
    }
}

pub async fn get_theme(State(state): State<AppState>, Path(code): Path<String>) -> Response {
    match state.themes.get(&code) {
        Some(theme) => Json(theme).into_response(),
        None => theme_not_found(&code),
    }
}

/// The theme's CSS variables as a `:root` stylesheet.
pub async fn get_theme_style(State(state): State<AppState>, Path(code): Path<String>) -> Response {
    let Some(value) = state.themes.get(&code) else {
        return theme_not_found(&code);
    };
    match Theme::from_value(value) {
        Some(theme) => ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], theme.style()).into_response(),
        None => {
            tracing::warn!(code = %code, "Stored theme document is malformed");
            error_response(StatusCode::UNPROCESSABLE_ENTITY, format!("theme '{}' is malformed", code))
        }
    }
}

fn theme_not_found(code: &str) -> Response {
    error_response(StatusCode::NOT_FOUND, format!("theme '{}' not found", code))
}
