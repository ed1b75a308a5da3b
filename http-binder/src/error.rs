//! Error types and HTTP response conversion
//!
//! Two classes of failure exist:
//!
//! - **classified** errors carry an [`HttpError`] with a status code and a
//!   message that is safe to show to the client;
//! - **unclassified** errors (anything else) are rendered as a generic
//!   `500 Internal server error` and their text never leaves the process.
//!
//! Binding failures are wrapped with the [`BindStage`] that produced them.
//! The wrapper only changes `Display`; status and message still come from the
//! innermost [`HttpError`].

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::responder;

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Binding stage a failure originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindStage {
    /// Route (path) parameter binding
    Route,
    /// Query parameter, filter and sort binding on GET
    Query,
    /// Patch field extraction on PATCH
    Patch,
    /// JSON body decoding
    Json,
}

impl fmt::Display for BindStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Route => write!(f, "route param"),
            Self::Query => write!(f, "query param"),
            Self::Patch => write!(f, "patch request"),
            Self::Json => write!(f, "json body"),
        }
    }
}

/// An error with an HTTP status code and a client-facing message
///
/// This is the only error the responder turns into a non-500 response.
///
/// # Example
///
/// ```rust
/// use axum::http::StatusCode;
/// use http_binder::HttpError;
///
/// let err = HttpError::bad_request("limit must be a positive integer");
/// assert_eq!(err.status(), StatusCode::BAD_REQUEST);
/// assert!(err.is_client_error());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    status: StatusCode,
    message: String,
}

impl HttpError {
    /// Create an error with an arbitrary status code
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 400 Bad Request
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 401 Unauthorized
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// 403 Forbidden
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    /// 404 Not Found
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// 409 Conflict
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// 500 Internal Server Error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// The HTTP status code
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// The client-facing message
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the error is attributable to the caller (4xx)
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status.is_client_error()
    }

    /// Whether the error is an internal failure (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {}

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    /// Classified error with status code and message
    #[error("{0}")]
    Http(HttpError),

    /// Failure during one binding stage
    #[error("couldn't bind {stage}: {source}")]
    Bind {
        /// Stage that failed
        stage: BindStage,
        /// Underlying failure
        source: Box<Error>,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unclassified failure from business code
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl Error {
    /// Wrap this error with the binding stage it came from
    #[must_use]
    pub fn in_stage(self, stage: BindStage) -> Self {
        Self::Bind {
            stage,
            source: Box::new(self),
        }
    }

    /// The classified error behind any stage wrappers, if there is one
    #[must_use]
    pub fn http_error(&self) -> Option<&HttpError> {
        match self {
            Self::Http(err) => Some(err),
            Self::Bind { source, .. } => source.http_error(),
            _ => None,
        }
    }

    /// The outermost binding stage, if this is a binding failure
    #[must_use]
    pub fn stage(&self) -> Option<BindStage> {
        match self {
            Self::Bind { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Status code the responder will use for this error
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.http_error()
            .map_or(StatusCode::INTERNAL_SERVER_ERROR, HttpError::status)
    }
}

impl From<HttpError> for Error {
    fn from(err: HttpError) -> Self {
        Self::Http(err)
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        responder::respond_error(&self)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        Error::from(self).into_response()
    }
}

/// Error response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructor_status_codes() {
        assert_eq!(HttpError::bad_request("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(HttpError::unauthorized("x").status(), StatusCode::UNAUTHORIZED);
        assert_eq!(HttpError::forbidden("x").status(), StatusCode::FORBIDDEN);
        assert_eq!(HttpError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(HttpError::conflict("x").status(), StatusCode::CONFLICT);
        assert_eq!(
            HttpError::internal("x").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            HttpError::new(StatusCode::IM_A_TEAPOT, "x").status(),
            StatusCode::IM_A_TEAPOT
        );
    }

    #[test]
    fn test_classification() {
        assert!(HttpError::bad_request("x").is_client_error());
        assert!(!HttpError::bad_request("x").is_server_error());
        assert!(HttpError::internal("x").is_server_error());
        assert!(!HttpError::internal("x").is_client_error());
    }

    #[test]
    fn test_http_error_display_is_message() {
        let err = HttpError::not_found("user not found");
        assert_eq!(err.to_string(), "user not found");
        assert_eq!(err.message(), "user not found");
    }

    #[test]
    fn test_bind_stage_display() {
        assert_eq!(BindStage::Route.to_string(), "route param");
        assert_eq!(BindStage::Query.to_string(), "query param");
        assert_eq!(BindStage::Patch.to_string(), "patch request");
        assert_eq!(BindStage::Json.to_string(), "json body");
    }

    #[test]
    fn test_stage_wrapper_keeps_http_error() {
        let err = Error::from(HttpError::bad_request("missing required route parameter: id"))
            .in_stage(BindStage::Route);

        assert_eq!(err.stage(), Some(BindStage::Route));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.http_error().map(HttpError::message),
            Some("missing required route parameter: id")
        );
        assert_eq!(
            err.to_string(),
            "couldn't bind route param: missing required route parameter: id"
        );
    }

    #[test]
    fn test_nested_wrappers_resolve_innermost() {
        let err = Error::from(HttpError::conflict("stale"))
            .in_stage(BindStage::Patch)
            .in_stage(BindStage::Json);
        assert_eq!(err.stage(), Some(BindStage::Json));
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_unclassified_errors_are_500() {
        let err = Error::from(anyhow::anyhow!("database exploded"));
        assert!(err.http_error().is_none());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let err = Error::from(std::io::Error::other("disk"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_response_serde() {
        let body = ErrorResponse::new("bad input");
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"error":"bad input"}"#);
        let back: ErrorResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(back, body);
    }
}
