//! Span naming and HTTP attribute enrichment.
//!
//! # Responsibilities
//! - Describe an intercepted call as inbound or outbound
//! - Derive the span name and `http.*` attributes for it
//! - Write the label onto a caller-owned span
//!
//! # Design Decisions
//! - Inbound spans are named after the matched whitelist template, so
//!   `/users/1` and `/users/2` group under `GET /app/users/:id`
//! - Outbound spans use the literal host and path, no whitelist lookup
//! - Enrichment never creates or ends spans and never fails

use std::collections::BTreeMap;
use std::sync::Arc;

use opentelemetry::trace::SpanBuilder;
use opentelemetry::KeyValue;

use crate::routing::Whitelist;

/// Substituted when a request carries no method.
pub const UNKNOWN_METHOD: &str = "UNKNOWN-METHOD";

pub const ATTR_HTTP_METHOD: &str = "http.method";
pub const ATTR_HTTP_URL: &str = "http.url";
pub const ATTR_HTTP_STATUS_CODE: &str = "http.status_code";

/// An intercepted HTTP call, as seen by the enricher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestDescriptor {
    /// A request received by this server.
    Inbound {
        method: Option<String>,
        path: String,
    },
    /// A request this process sends to another service.
    Outbound {
        method: Option<String>,
        host: String,
        path: String,
    },
}

impl RequestDescriptor {
    /// Build an inbound descriptor from a raw request target.
    ///
    /// The query string is dropped; a missing target becomes an empty path.
    pub fn inbound(method: Option<&str>, raw_url: Option<&str>) -> Self {
        RequestDescriptor::Inbound {
            method: method.map(str::to_string),
            path: strip_query(raw_url.unwrap_or_default()).to_string(),
        }
    }

    pub fn outbound(method: Option<&str>, host: &str, raw_path: Option<&str>) -> Self {
        RequestDescriptor::Outbound {
            method: method.map(str::to_string),
            host: host.to_string(),
            path: strip_query(raw_path.unwrap_or_default()).to_string(),
        }
    }

    pub fn is_outbound(&self) -> bool {
        matches!(self, RequestDescriptor::Outbound { .. })
    }

    /// The request method, or [`UNKNOWN_METHOD`].
    pub fn method(&self) -> &str {
        let method = match self {
            RequestDescriptor::Inbound { method, .. } => method,
            RequestDescriptor::Outbound { method, .. } => method,
        };
        method.as_deref().unwrap_or(UNKNOWN_METHOD)
    }

    /// The query-free request path.
    pub fn path(&self) -> &str {
        match self {
            RequestDescriptor::Inbound { path, .. } => path,
            RequestDescriptor::Outbound { path, .. } => path,
        }
    }
}

fn strip_query(url: &str) -> &str {
    url.split('?').next().unwrap_or_default()
}

/// Name and attributes written onto a span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanLabel {
    pub name: String,
    pub method: String,
    pub url: String,
}

impl SpanLabel {
    /// Overwrite the span's name and `http.method` / `http.url` attributes.
    pub fn apply<S: SpanHandle + ?Sized>(&self, span: &mut S) {
        span.update_name(self.name.clone());
        span.set_attribute(ATTR_HTTP_METHOD, self.method.clone());
        span.set_attribute(ATTR_HTTP_URL, self.url.clone());
    }
}

/// Mutable access to a span label owned by someone else (usually a span
/// builder about to be started).
pub trait SpanHandle {
    fn update_name(&mut self, name: String);
    fn set_attribute(&mut self, key: &'static str, value: String);
}

/// Labels a span before it starts. Attributes are replaced by key, so the
/// started span carries each `http.*` attribute once.
impl SpanHandle for SpanBuilder {
    fn update_name(&mut self, name: String) {
        self.name = name.into();
    }

    fn set_attribute(&mut self, key: &'static str, value: String) {
        let attribute = KeyValue::new(key, value);
        let attributes = self.attributes.get_or_insert_with(Vec::new);
        match attributes.iter_mut().find(|kv| kv.key.as_str() == key) {
            Some(existing) => *existing = attribute,
            None => attributes.push(attribute),
        }
    }
}

/// In-memory span handle. Attributes are keyed, so relabeling overwrites.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordedSpan {
    pub name: String,
    pub attributes: BTreeMap<&'static str, String>,
}

impl SpanHandle for RecordedSpan {
    fn update_name(&mut self, name: String) {
        self.name = name;
    }

    fn set_attribute(&mut self, key: &'static str, value: String) {
        self.attributes.insert(key, value);
    }
}

/// Derives span labels from request descriptors.
#[derive(Debug, Clone)]
pub struct SpanEnricher {
    app_name: String,
    whitelist: Arc<Whitelist>,
}

impl SpanEnricher {
    pub fn new(app_name: impl Into<String>, whitelist: Arc<Whitelist>) -> Self {
        Self {
            app_name: app_name.into(),
            whitelist,
        }
    }

    pub fn whitelist(&self) -> &Whitelist {
        &self.whitelist
    }

    /// Compute the label for a request without touching any span.
    pub fn label(&self, request: &RequestDescriptor) -> SpanLabel {
        let method = request.method();

        let name = match request {
            RequestDescriptor::Inbound { path, .. } => {
                // Non-whitelisted requests are normally skipped before this point
                let target = self
                    .whitelist
                    .find_matching_pattern(path)
                    .map(|p| p.template())
                    .unwrap_or(path);
                format!("{} /{}{}", method, self.app_name, target)
            }
            RequestDescriptor::Outbound { host, path, .. } => {
                format!("{} {}{}", method, host, path)
            }
        };

        SpanLabel {
            name,
            method: method.to_string(),
            url: request.path().to_string(),
        }
    }

    /// Label `span` for `request`. Repeating this leaves the same name and
    /// attributes as a single call.
    pub fn enrich<S: SpanHandle + ?Sized>(&self, span: &mut S, request: &RequestDescriptor) {
        self.label(request).apply(span);
    }
}
