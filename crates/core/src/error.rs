use crate::response::{Envelope, FieldError};

/// The two failure kinds a wrapped route or action can end in.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The input schema rejected the request body. Messages are forwarded
    /// to the client as-is.
    #[error("Input validation failed with {} error(s)", .0.len())]
    InputValidation(Vec<FieldError>),

    /// The handler failed, panicked, or produced output the output schema
    /// rejected. Only a generic message reaches the client.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Convert into the uniform envelope, logging internal causes.
    pub fn into_envelope<T>(self) -> Envelope<T> {
        match self {
            CoreError::InputValidation(errors) => {
                tracing::debug!(error_count = errors.len(), "Input rejected by schema");
                Envelope::invalid(errors)
            }
            CoreError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                Envelope::internal_error()
            }
        }
    }
}
