//! Path template matching logic.
//!
//! # Responsibilities
//! - Parse whitelist templates into literal/parameter segments
//! - Compare a concrete request path against a template segment by segment
//!
//! # Design Decisions
//! - Path matching is case-sensitive, no percent-decoding
//! - `:name` segments match any single concrete segment (including empty)
//! - Segment counts must be equal: no prefix or partial matches
//! - Trailing slashes are stripped before splitting (root `/` is kept)
//! - No regex to guarantee O(n) matching

use std::fmt;

/// Marker that turns a template segment into a parameter.
pub const PARAM_MARKER: char = ':';

/// One `/`-separated piece of a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the concrete segment exactly.
    Literal(String),
    /// Matches any concrete segment. Holds the name without the marker.
    Param(String),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        match raw.strip_prefix(PARAM_MARKER) {
            Some(name) => Segment::Param(name.to_string()),
            None => Segment::Literal(raw.to_string()),
        }
    }

    /// Returns true if this segment accepts the concrete value.
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Segment::Param(_) => true,
            Segment::Literal(literal) => literal == value,
        }
    }
}

/// A whitelisted URL template such as `/users/:id`.
///
/// Keeps the template as written (used for span names) alongside its parsed
/// segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    template: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parse a template. Never fails: any string is a valid (if unmatchable) template.
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let segments = split_segments(&template).map(Segment::parse).collect();
        Self { template, segments }
    }

    /// The template as configured, e.g. `/users/:id`.
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Prefix this template with a base path, e.g. `/api` + `/users/:id`.
    ///
    /// Trailing slashes of the base are dropped before joining.
    pub fn qualified(&self, base_path: &str) -> PathPattern {
        let base = base_path.trim_end_matches('/');
        PathPattern::new(format!("{}{}", base, self.template))
    }

    /// Returns true if the concrete path matches this template.
    pub fn matches(&self, path: &str) -> bool {
        let mut concrete = split_segments(path);
        let mut expected = self.segments.iter();

        loop {
            match (expected.next(), concrete.next()) {
                (Some(segment), Some(value)) => {
                    if !segment.accepts(value) {
                        return false;
                    }
                }
                (None, None) => return true,
                // Segment counts differ
                _ => return false,
            }
        }
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

/// Split a path into segments after stripping trailing slashes.
///
/// `""` yields one empty segment, `/` yields two, `/a/b/` yields `["", "a", "b"]`.
pub fn split_segments(path: &str) -> std::str::Split<'_, char> {
    normalize(path).split('/')
}

fn normalize(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() && path.starts_with('/') {
        "/"
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_segments() {
        let pattern = PathPattern::new("/users/:id/orders");
        assert_eq!(
            pattern.segments(),
            &[
                Segment::Literal(String::new()),
                Segment::Literal("users".into()),
                Segment::Param("id".into()),
                Segment::Literal("orders".into()),
            ]
        );
        assert_eq!(pattern.template(), "/users/:id/orders");
    }

    #[test]
    fn test_param_matches_any_value() {
        let pattern = PathPattern::new("/users/:id");
        assert!(pattern.matches("/users/42"));
        assert!(pattern.matches("/users/abc-def"));
        assert!(!pattern.matches("/accounts/42"));
    }

    #[test]
    fn test_literal_match_is_case_sensitive() {
        let pattern = PathPattern::new("/Users");
        assert!(pattern.matches("/Users"));
        assert!(!pattern.matches("/users"));
    }

    #[test]
    fn test_segment_count_must_match() {
        let pattern = PathPattern::new("/users/:id");
        assert!(!pattern.matches("/users"));
        assert!(!pattern.matches("/users/42/extra"));
        // A parameter never swallows more than one segment
        assert!(!PathPattern::new("/:all").matches("/a/b"));
    }

    #[test]
    fn test_trailing_slash_is_ignored() {
        let pattern = PathPattern::new("/users/:id");
        assert!(pattern.matches("/users/42/"));
        assert!(PathPattern::new("/users/").matches("/users"));
    }

    #[test]
    fn test_root_and_empty_paths() {
        let root = PathPattern::new("/");
        assert!(root.matches("/"));
        assert!(root.matches("//"));
        assert!(!root.matches(""));
        assert!(!PathPattern::new("/users").matches(""));
    }

    #[test]
    fn test_qualified_strips_base_trailing_slash() {
        let pattern = PathPattern::new("/users/:id");
        assert_eq!(pattern.qualified("/api/").template(), "/api/users/:id");
        assert_eq!(pattern.qualified("").template(), "/users/:id");
        assert!(pattern.qualified("/api").matches("/api/users/7"));
    }

    #[test]
    fn test_equal_length_property() {
        // For equal segment counts, match iff every literal segment is equal
        let pattern = PathPattern::new("/a/:x/c/:y");
        let cases = [
            ("/a/1/c/2", true),
            ("/a//c/z", true),
            ("/b/1/c/2", false),
            ("/a/1/d/2", false),
        ];
        for (path, expected) in cases {
            assert_eq!(pattern.matches(path), expected, "path {path}");
        }
    }
}
