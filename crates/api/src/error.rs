use axum::response::{IntoResponse, Response};
use vergestack_core::{Envelope, FieldError};

use crate::response::JsonEnvelope;

/// Application-level error type for the HTTP layer.
///
/// Covers the failures that happen outside the validate → handle pipeline
/// (which reports through `vergestack_core::CoreError`). Every variant
/// renders as the same envelope shape the wrapped routes use.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The request could not be read as JSON.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Invalid server configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for fallible HTTP-layer operations.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Convert into the uniform envelope. Server-side causes are logged and
    /// replaced by the generic message.
    pub fn into_envelope<T>(self) -> Envelope<T> {
        match self {
            AppError::BadRequest(msg) => Envelope::invalid(vec![FieldError::general(msg)]),
            AppError::Config(msg) => {
                tracing::error!(error = %msg, "Configuration error");
                Envelope::internal_error()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        JsonEnvelope(self.into_envelope::<()>()).into_response()
    }
}
