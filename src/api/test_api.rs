//! Load-testing endpoint.

use std::time::Duration;

use axum::Json;
use serde_json::{json, Value};

const MAX_DELAY_MS: u64 = 1000;
const COPIES: usize = 1000;

/// Wait up to a second, then answer with a large list of sample themes.
pub async fn test_api() -> Json<Vec<Value>> {
    let delay = fastrand::u64(0..=MAX_DELAY_MS);
    tokio::time::sleep(Duration::from_millis(delay)).await;

    tracing::info!(delay_ms = delay, "Test api called");
    Json(vec![sample_theme(); COPIES])
}

fn sample_theme() -> Value {
    json!({
        "meta": {
            "code": "theme-a",
            "id": "1",
            "name": "Theme A",
            "description": "Sample theme"
        },
        "properties": {
            "--primary-color": "#1d4ed8",
            "--secondary-color": "#f59e0b",
            "--font-family": "Inter, sans-serif",
            "--border-radius": "4px"
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Theme;

    #[test]
    fn test_sample_theme_is_a_theme() {
        let theme = Theme::from_value(sample_theme()).unwrap();
        assert_eq!(theme.meta.code, "theme-a");
        assert_eq!(theme.css_variables().count(), 4);
    }
}
