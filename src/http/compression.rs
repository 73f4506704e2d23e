//! Response compression.
//!
//! # Responsibilities
//! - gzip response bodies for clients that accept it
//! - Leave error pages and non-compressible content untouched
//!
//! # Design Decisions
//! - gzip only: brotli shrank bodies a little more but raised time to first byte
//! - Negotiation and body wrapping are delegated to tower-http

use axum::http::{Extensions, HeaderMap, StatusCode, Version};
use tower_http::compression::predicate::{And, DefaultPredicate, Predicate};
use tower_http::compression::CompressionLayer;

/// Handlers set this header on error pages to opt out of compression.
pub const ERROR_MARKER_HEADER: &str = "x-app-error";

type SkipErrorPages = fn(StatusCode, Version, &HeaderMap, &Extensions) -> bool;

pub type ResponsePredicate = And<DefaultPredicate, SkipErrorPages>;

/// Build the gzip compression layer.
pub fn compression_layer() -> CompressionLayer<ResponsePredicate> {
    let skip: SkipErrorPages = is_compressible_status;
    CompressionLayer::new().compress_when(DefaultPredicate::new().and(skip))
}

fn is_compressible_status(
    status: StatusCode,
    _version: Version,
    headers: &HeaderMap,
    _extensions: &Extensions,
) -> bool {
    !status.is_client_error()
        && !status.is_server_error()
        && !headers.contains_key(ERROR_MARKER_HEADER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_pages_not_compressed() {
        let ext = Extensions::new();
        let mut headers = HeaderMap::new();

        assert!(is_compressible_status(StatusCode::OK, Version::HTTP_11, &headers, &ext));
        assert!(!is_compressible_status(StatusCode::NOT_FOUND, Version::HTTP_11, &headers, &ext));
        assert!(!is_compressible_status(StatusCode::BAD_GATEWAY, Version::HTTP_11, &headers, &ext));

        headers.insert(ERROR_MARKER_HEADER, "true".parse().unwrap());
        assert!(!is_compressible_status(StatusCode::OK, Version::HTTP_11, &headers, &ext));
    }
}
