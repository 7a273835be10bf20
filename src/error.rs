//! Error taxonomy shared by services and HTTP handlers
//!
//! Every failure crossing a request boundary is converted into the
//! `{error, details}` envelope; nothing panics out of a handler.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or empty input, user-correctable
    #[error("{0}")]
    Validation(String),

    /// Spreadsheet could not be read
    #[error("failed to parse spreadsheet: {0}")]
    Parse(String),

    /// Referenced resource does not exist
    #[error("{0}")]
    NotFound(String),

    /// Vendor answered with a non-success status
    #[error("Kardinal returned {status}: {body}")]
    Gateway { status: u16, body: String },

    /// Transport failure reaching the vendor or a messaging provider
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Messaging provider rejected the hand-off
    #[error("messaging provider error: {0}")]
    Notification(String),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            Error::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            Error::Parse(msg) => (
                StatusCode::BAD_REQUEST,
                "Failed to parse spreadsheet".to_string(),
                Some(msg.clone()),
            ),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            Error::Gateway { status, body } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to reach optimization service".to_string(),
                Some(format!("Kardinal returned {}: {}", status, body)),
            ),
            Error::Network(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Network error".to_string(),
                Some(e.to_string()),
            ),
            Error::Notification(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to send message".to_string(),
                Some(msg.clone()),
            ),
        };

        let body = match details {
            Some(details) => json!({ "error": error, "details": details }),
            None => json!({ "error": error }),
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
