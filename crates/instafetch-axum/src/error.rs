//! HTTP error types and status mapping.
//!
//! [`status_for`] is shared by the JSON API and the HTML form, so both
//! surfaces answer a given failure with the same status code.

use std::any::Any;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use instafetch_core::FetchError;
use serde::Serialize;
use thiserror::Error;

use crate::page::{ErrorNotice, FormPage, render_form};

/// Shown on the form when a request fails in an unexpected way.
pub const UNEXPECTED_FAILURE: &str = "An unexpected error occurred. Please try again.";

/// Status code for a fetch failure.
pub const fn status_for(err: &FetchError) -> StatusCode {
    match err {
        FetchError::Validation(_) => StatusCode::BAD_REQUEST,
        FetchError::DownloadFailed { .. } => StatusCode::BAD_GATEWAY,
        FetchError::TimedOut { .. } => StatusCode::GATEWAY_TIMEOUT,
        FetchError::OutputNotFound { .. } => StatusCode::NOT_FOUND,
        FetchError::Cancelled | FetchError::NotInstalled { .. } | FetchError::Io { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Web adapter error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request (malformed input that never reached the fetch pipeline).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The fetch pipeline failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HttpError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Fetch(err) => status_for(err),
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable error type discriminant for client-side handling.
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::BadRequest(_) => "bad_request",
            Self::Fetch(err) => err.kind(),
            Self::Internal(_) => "internal",
        }
    }

    /// Message safe to show to end users.
    pub fn message(&self) -> String {
        match self {
            Self::NotFound(msg) | Self::BadRequest(msg) => msg.clone(),
            Self::Fetch(err) => err.user_message(),
            Self::Internal(_) => "Internal server error".to_string(),
        }
    }

    pub const fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Fetch(err) => err.hint(),
            _ => None,
        }
    }
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
    /// Stable error type discriminant for client-side handling
    #[serde(rename = "type")]
    error_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<&'static str>,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(target: "instafetch.http", error = %self, "Request failed");
        }

        let body = ErrorBody {
            error: self.message(),
            status: status.as_u16(),
            error_type: self.error_type(),
            hint: self.hint(),
        };

        (status, axum::Json(body)).into_response()
    }
}

// ============================================================================
// Panic responses
// ============================================================================

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

/// Response for a panicking JSON API handler.
pub fn api_panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    HttpError::Internal(format!("handler panicked: {}", panic_message(payload.as_ref())))
        .into_response()
}

/// Response for a panicking HTML handler: the empty form with a generic error.
pub fn page_panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!(
        target: "instafetch.http",
        panic = panic_message(payload.as_ref()),
        "Request failed"
    );

    let page = FormPage {
        error: Some(ErrorNotice {
            kind: "internal",
            message: UNEXPECTED_FAILURE.to_string(),
            hint: None,
        }),
        ..FormPage::default()
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Html(render_form(&page))).into_response()
}
