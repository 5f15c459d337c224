//! Error types for the HTTP front end.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response}
};
use errors::PreprocessError;
use serde::Serialize;
use thiserror::Error;

/// Request-level errors, each mapped to a status code and a stable error code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing or unknown API token")]
    Unauthorized,

    #[error("Request body is not valid JSON: {reason}")]
    InvalidJson { reason: String },

    #[error("Request body could not be read: {reason}")]
    UnreadableBody { reason: String },

    #[error(transparent)]
    Preprocess(#[from] PreprocessError),

    #[error("Metrics are not enabled")]
    MetricsDisabled
}

impl ApiError {
    /// Label used on the `facts_rejected_total` counter.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::InvalidJson { .. } => "invalid_json",
            Self::UnreadableBody { .. } => "unreadable_body",
            Self::Preprocess(_) => "invalid_input",
            Self::MetricsDisabled => "metrics_disabled"
        }
    }
}

/// Error response body for HTTP endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::InvalidJson { .. } => (StatusCode::BAD_REQUEST, "INVALID_JSON"),
            Self::UnreadableBody { .. } => (StatusCode::BAD_REQUEST, "UNREADABLE_BODY"),
            Self::Preprocess(PreprocessError::InvalidInput { .. }) => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT")
            }
            Self::MetricsDisabled => (StatusCode::NOT_FOUND, "NOT_FOUND")
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string()
        };

        (status, Json(body)).into_response()
    }
}

/// Startup and serving errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid listen address {authority}: {reason}")]
    Address { authority: String, reason: String },

    #[error("Failed to bind to {authority}: {reason}")]
    Bind { authority: String, reason: String },

    #[error("Server error: {reason}")]
    Serve { reason: String },

    #[error("Metrics recorder install failed: {reason}")]
    Metrics { reason: String }
}
