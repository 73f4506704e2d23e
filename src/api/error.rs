//! Error classification shared by handlers and logs.

use std::fmt;

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::http::compression::ERROR_MARKER_HEADER;

/// Error categories reported in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    ServerError,
    UserMismatch,
    Authorization,
    StaleRequest,
    ObservabilityExport,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::ServerError => "SERVER_ERROR",
            ErrorType::UserMismatch => "USER_MISMATCH_ERROR",
            ErrorType::Authorization => "AUTHORIZATION_ERROR",
            ErrorType::StaleRequest => "STALE_REQUEST",
            ErrorType::ObservabilityExport => "FAILED_TO_POST_DATA_TO_OBSERVABILITY_PLATFORM",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plain-text error page, marked so it is never compressed.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let mut response = (status, message.into()).into_response();
    response
        .headers_mut()
        .insert(ERROR_MARKER_HEADER, HeaderValue::from_static("true"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_type_codes() {
        assert_eq!(ErrorType::ServerError.as_str(), "SERVER_ERROR");
        assert_eq!(ErrorType::UserMismatch.as_str(), "USER_MISMATCH_ERROR");
        assert_eq!(ErrorType::Authorization.to_string(), "AUTHORIZATION_ERROR");
        assert_eq!(ErrorType::StaleRequest.as_str(), "STALE_REQUEST");
        assert_eq!(
            ErrorType::ObservabilityExport.as_str(),
            "FAILED_TO_POST_DATA_TO_OBSERVABILITY_PLATFORM"
        );
    }

    #[test]
    fn test_error_response_is_marked() {
        let response = error_response(StatusCode::NOT_FOUND, "missing");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[ERROR_MARKER_HEADER], "true");
    }
}
