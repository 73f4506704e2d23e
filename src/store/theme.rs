//! Typed view over theme documents.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Descriptive header of a theme or component.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ThemeMeta {
    pub code: String,
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A theme: metadata plus CSS custom properties and nested component blocks.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Theme {
    pub meta: ThemeMeta,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub components: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub layouts: BTreeMap<String, Value>,
}

impl Theme {
    pub fn from_value(value: Value) -> Option<Self> {
        serde_json::from_value(value).ok()
    }

    /// Top-level CSS variables (`--*` keys with string values), sorted by name.
    pub fn css_variables(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties.iter().filter_map(|(key, value)| {
            match (key.starts_with("--"), value.as_str()) {
                (true, Some(v)) => Some((key.as_str(), v)),
                _ => None,
            }
        })
    }

    /// Render the variables as a `:root` style block.
    pub fn style(&self) -> String {
        let mut css = String::from(":root {\n");
        for (name, value) in self.css_variables() {
            let _ = writeln!(css, "  {}: {};", name, value);
        }
        css.push('}');
        css.push('\n');
        css
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "meta": {"code": "theme-a", "id": "a", "name": "A", "description": "It is a Theme A."},
            "properties": {
                "--theme-main-color-1": "#239BEB",
                "--theme-tile-border-radius": "16px",
                "button": {"meta": {"code": "button-a", "id": "a", "name": "A"}},
                "--not-a-string": 4
            }
        })
    }

    #[test]
    fn test_parse_theme() {
        let theme = Theme::from_value(sample()).unwrap();
        assert_eq!(theme.meta.code, "theme-a");
        assert!(theme.components.is_empty());
        assert!(Theme::from_value(json!({"properties": {}})).is_none());
    }

    #[test]
    fn test_style_renders_string_variables_only() {
        let theme = Theme::from_value(sample()).unwrap();
        assert_eq!(
            theme.style(),
            ":root {\n  --theme-main-color-1: #239BEB;\n  --theme-tile-border-radius: 16px;\n}\n"
        );
    }
}
