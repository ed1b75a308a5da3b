//! JSON response formatting
//!
//! Success bodies are written as JSON with `200 OK`, or `204 No Content` when
//! there is nothing to return. Errors are written as `{"error": "<message>"}`
//! with the status of the innermost [`HttpError`]; any other error becomes a
//! generic `500` and is only logged.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::{Error, ErrorResponse, HttpError};

/// Message sent for errors that carry no client-facing classification
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Write a success response
///
/// # Example
///
/// ```rust
/// use axum::http::StatusCode;
/// use http_binder::respond_success;
///
/// assert_eq!(respond_success(Some(&vec![1, 2, 3])).status(), StatusCode::OK);
/// assert_eq!(respond_success::<()>(None).status(), StatusCode::NO_CONTENT);
/// ```
pub fn respond_success<T>(body: Option<&T>) -> Response
where
    T: Serialize + ?Sized,
{
    let Some(body) = body else {
        return StatusCode::NO_CONTENT.into_response();
    };

    match serde_json::to_vec(body) {
        Ok(bytes) => json_response(StatusCode::OK, bytes),
        Err(err) => {
            tracing::error!(error = %err, "failed to encode response body");
            respond_error(&HttpError::internal("failed to encode response").into())
        }
    }
}

/// Write an error response
pub fn respond_error(err: &Error) -> Response {
    let (status, message) = match err.http_error() {
        Some(http) => {
            if http.is_server_error() {
                tracing::error!(status = http.status().as_u16(), error = %err, "request failed");
            } else {
                tracing::debug!(status = http.status().as_u16(), error = %err, "request rejected");
            }
            (http.status(), http.message())
        }
        None => {
            tracing::error!(error = %err, "unhandled error");
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
        }
    };

    encode_or_text(status, &ErrorResponse::new(message), message)
}

/// JSON-encode `envelope`, falling back to `fallback` as plain text
fn encode_or_text<T>(status: StatusCode, envelope: &T, fallback: &str) -> Response
where
    T: Serialize + ?Sized,
{
    match serde_json::to_vec(envelope) {
        Ok(bytes) => json_response(status, bytes),
        Err(err) => {
            tracing::error!(error = %err, "failed to encode error response");
            (
                status,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                fallback.to_string(),
            )
                .into_response()
        }
    }
}

fn json_response(status: StatusCode, bytes: Vec<u8>) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], bytes).into_response()
}
