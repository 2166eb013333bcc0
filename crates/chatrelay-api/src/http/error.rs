//! Application error type mapping relay outcomes to HTTP responses.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use chatrelay_types::error::RelayError;
use chatrelay_types::relay::ErrorBody;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Relay failure, mapped per variant.
    Relay(RelayError),
    /// Request body could not be read as JSON.
    MalformedBody(String),
}

impl From<RelayError> for AppError {
    fn from(e: RelayError) -> Self {
        AppError::Relay(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::MalformedBody(e.body_text())
    }
}

impl AppError {
    fn status_and_body(&self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::MalformedBody(msg) => (StatusCode::BAD_REQUEST, ErrorBody::new(msg.clone())),
            AppError::Relay(RelayError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, ErrorBody::new(msg.clone()))
            }
            AppError::Relay(RelayError::Upstream { status, body }) => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                ErrorBody::new(body.clone()),
            ),
            AppError::Relay(e @ RelayError::RunNotCompleted { status }) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::new(e.to_string()).with_status(status.as_str()),
            ),
            AppError::Relay(e @ RelayError::NoAssistantMessage) => {
                (StatusCode::NOT_FOUND, ErrorBody::new(e.to_string()))
            }
            AppError::Relay(
                e @ (RelayError::MissingCompletion
                | RelayError::Agent(_)
                | RelayError::Configuration(_)),
            ) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::new(e.to_string())),
            AppError::Relay(
                e @ (RelayError::Transport(_) | RelayError::Decode(_) | RelayError::Internal(_)),
            ) => {
                tracing::error!(error = %e, "relay failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new("Internal server error"),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}
