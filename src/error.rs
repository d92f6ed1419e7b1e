//! Unified error type.

use std::fmt;

use tracing::warn;

use crate::response::{IntoResponse, Json, Response};
use crate::status::Status;
use crate::validation::ValidationErrors;

/// The error type returned by persona's fallible infrastructure operations.
///
/// Application-level errors (404, 422, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values via [`ApiError`](crate::ApiError), not
/// as `Error`s. This type surfaces failures that happen around the request
/// path: loading configuration, binding to a port or accepting a connection.
#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Config(config::ConfigError),
    Addr(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e)     => write!(f, "io: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Addr(a)   => write!(f, "invalid socket address `{a}`"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e)     => Some(e),
            Self::Config(e) => Some(e),
            Self::Addr(_)   => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Self::Config(e)
    }
}

// ── Application errors ────────────────────────────────────────────────────────

/// The ways a request can fail after routing.
///
/// Handlers return `Result<_, ApiError>` and use `?` on validation results;
/// the conversion to a `422` or `404` response happens in
/// [`IntoResponse`](crate::IntoResponse).
#[derive(Debug)]
pub enum ApiError {
    /// Input failed its declared constraints. Answers `422`.
    Validation(ValidationErrors),
    /// The addressed resource does not exist. Answers `404 {"detail": ...}`.
    NotFound(String),
    /// The handler could not build its answer. Logged, answers a bare `500`.
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(e) => write!(f, "validation failed for {} field(s)", e.len()),
            Self::NotFound(detail) => write!(f, "not found: {detail}"),
            Self::Internal(reason) => write!(f, "internal error: {reason}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<ValidationErrors> for ApiError {
    fn from(e: ValidationErrors) -> Self {
        Self::Validation(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(e) => e.into_response(),
            Self::NotFound(detail) => {
                (Status::NotFound, Json(serde_json::json!({ "detail": detail }))).into_response()
            }
            Self::Internal(reason) => {
                warn!("handler failed: {reason}");
                Response::status(Status::InternalServerError)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_map_to_statuses() {
        let invalid = ApiError::from(ValidationErrors::single("body", "field required"));
        assert_eq!(invalid.into_response().status_code(), 422);

        let missing = ApiError::NotFound("gone".to_owned()).into_response();
        assert_eq!(missing.status_code(), 404);
        assert_eq!(missing.body(), br#"{"detail":"gone"}"#);

        let broken = ApiError::Internal("boom".to_owned()).into_response();
        assert_eq!(broken.status_code(), 500);
        assert!(broken.body().is_empty());
    }
}
