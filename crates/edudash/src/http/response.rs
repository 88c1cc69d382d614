//! Response envelopes.
//!
//! Every body is `{success, ...}`. Successes carry `data` (plus `total` for
//! lists and `message` for mutations); failures carry `message` and `error`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

use crate::error::Error;

/// Successful response body.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    /// Always `true`.
    pub success: bool,
    /// The payload.
    pub data: T,
    /// Number of items, for list responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    /// Human readable outcome, for mutations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl<T> ApiResponse<T> {
    /// A bare `{success, data}` body.
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data,
            total: None,
            message: None,
        }
    }

    /// A `{success, data, message}` body.
    pub fn with_message(data: T, message: &'static str) -> Self {
        Self {
            message: Some(message),
            ..Self::data(data)
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// A `{success, data, total}` body.
    pub fn list(data: Vec<T>) -> Self {
        let total = data.len();
        Self {
            total: Some(total),
            ..Self::data(data)
        }
    }
}

/// Failure response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    /// Always `false`.
    pub success: bool,
    /// What the caller was trying to do, or why it failed.
    pub message: String,
    /// The underlying error text.
    pub error: String,
}

/// An error ready to be turned into an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    /// Build an error response directly.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                success: false,
                message: message.into(),
                error: error.into(),
            },
        }
    }

    /// Map a service error onto a status code.
    ///
    /// `failure_message` is used for everything except not-found, which always
    /// reports `Student not found`.
    #[must_use]
    pub fn from_error(err: &Error, failure_message: &str) -> Self {
        let (status, message) = if err.is_not_found() {
            (StatusCode::NOT_FOUND, "Student not found")
        } else if err.is_client_error() {
            (StatusCode::BAD_REQUEST, failure_message)
        } else {
            (StatusCode::INTERNAL_SERVER_ERROR, failure_message)
        };

        if status.is_server_error() {
            error!(storage = err.is_storage_error(), "{}: {}", failure_message, err);
        } else if status == StatusCode::BAD_REQUEST {
            warn!("{}: {}", failure_message, err);
        }

        Self::new(status, message, err.to_string())
    }

    /// The status code this error maps to.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
