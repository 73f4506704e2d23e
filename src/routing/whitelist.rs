//! Whitelist lookup for traced HTTP paths.
//!
//! # Responsibilities
//! - Store compiled whitelist templates in configuration order
//! - Bind templates to the application base path
//! - Return the first matching template or an explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan over templates (acceptable for typical whitelist sizes)
//! - First match wins; overlapping templates resolve by configuration order
//! - Empty whitelist never matches

use crate::routing::matcher::PathPattern;

/// Outcome of matching one path against the whitelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult<'a> {
    pub matched: bool,
    pub matched_pattern: Option<&'a PathPattern>,
}

impl<'a> From<Option<&'a PathPattern>> for MatchResult<'a> {
    fn from(pattern: Option<&'a PathPattern>) -> Self {
        Self {
            matched: pattern.is_some(),
            matched_pattern: pattern,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    pattern: PathPattern,
    qualified: PathPattern,
}

/// Ordered set of path templates whose requests get traced.
#[derive(Debug, Clone, Default)]
pub struct Whitelist {
    base_path: String,
    entries: Vec<Entry>,
}

impl Whitelist {
    /// Compile templates against a base path.
    ///
    /// `base_path` may be a plain path (`/api`) or an absolute URL
    /// (`https://host/api`); in the latter case only its path is used.
    pub fn new<I, S>(patterns: I, base_path: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let base_path = resolve_base_path(base_path);
        let entries = patterns
            .into_iter()
            .map(|template| {
                let pattern = PathPattern::new(template);
                let qualified = pattern.qualified(&base_path);
                Entry { pattern, qualified }
            })
            .collect();

        Self { base_path, entries }
    }

    /// The normalized base path, without trailing slash.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Templates in configuration order.
    pub fn patterns(&self) -> impl Iterator<Item = &PathPattern> {
        self.entries.iter().map(|e| &e.pattern)
    }

    /// Find the first template (relative to the base path) matching `path`.
    pub fn find_matching_pattern(&self, path: &str) -> Option<&PathPattern> {
        if path.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|entry| entry.qualified.matches(path))
            .map(|entry| &entry.pattern)
    }

    /// Returns true if `path` matches any template.
    pub fn is_whitelisted(&self, path: &str) -> bool {
        self.find_matching_pattern(path).is_some()
    }

    pub fn match_path(&self, path: &str) -> MatchResult<'_> {
        self.find_matching_pattern(path).into()
    }
}

fn resolve_base_path(base: &str) -> String {
    let path = match url::Url::parse(base) {
        Ok(url) if url.has_host() => url.path().to_string(),
        _ => base.to_string(),
    };
    path.trim_end_matches('/').to_string()
}
