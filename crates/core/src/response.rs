//! Shared response envelope types.
//!
//! Every route and server action answers with an [`ApiResponse`], serialized
//! as `{ "status": "success", "data": ... }` or
//! `{ "status": "error", "errors": [...] }`. Routes additionally carry the
//! HTTP status code next to the body in an [`Envelope`].

use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Message returned to clients for every server-side failure.
///
/// The underlying cause is logged, never sent.
pub const GENERIC_ERROR_MESSAGE: &str = "An internal error occurred";

// ---------------------------------------------------------------------------
// FieldError
// ---------------------------------------------------------------------------

/// A single error reported to the client.
///
/// `field` holds the dotted path of the offending input field
/// (`address.city`, `tags[2]`). It is absent for errors that concern the
/// whole body and for server errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

impl FieldError {
    /// Error attached to a named field.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Error that does not belong to a single field.
    pub fn general(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// ApiResponse
// ---------------------------------------------------------------------------

/// Tagged success/error response body.
///
/// Exactly one of `data` / `errors` is present, matching `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ApiResponse<T> {
    Success { data: T },
    Error { errors: Vec<FieldError> },
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self::Success { data }
    }

    pub fn error(errors: Vec<FieldError>) -> Self {
        Self::Error { errors }
    }

    /// Error body carrying only [`GENERIC_ERROR_MESSAGE`].
    pub fn internal_error() -> Self {
        Self::Error {
            errors: vec![FieldError::general(GENERIC_ERROR_MESSAGE)],
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success { data } => Some(data),
            Self::Error { .. } => None,
        }
    }

    pub fn errors(&self) -> Option<&[FieldError]> {
        match self {
            Self::Success { .. } => None,
            Self::Error { errors } => Some(errors),
        }
    }

    /// Convert into a `Result`, consuming the response.
    pub fn into_result(self) -> Result<T, Vec<FieldError>> {
        match self {
            Self::Success { data } => Ok(data),
            Self::Error { errors } => Err(errors),
        }
    }
}

impl<T> From<Result<T, Vec<FieldError>>> for ApiResponse<T> {
    fn from(result: Result<T, Vec<FieldError>>) -> Self {
        match result {
            Ok(data) => Self::Success { data },
            Err(errors) => Self::Error { errors },
        }
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// An [`ApiResponse`] paired with the HTTP status code it is sent with.
///
/// `200` for success, `400` for input validation failures, `500` for handler
/// and output failures. The status code is not part of the serialized body.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<T> {
    pub status: StatusCode,
    pub body: ApiResponse<T>,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            body: ApiResponse::success(data),
        }
    }

    /// Client-fault envelope carrying field-level messages.
    pub fn invalid(errors: Vec<FieldError>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ApiResponse::error(errors),
        }
    }

    /// Server-fault envelope with the generic message.
    pub fn internal_error() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ApiResponse::internal_error(),
        }
    }

    pub fn into_body(self) -> ApiResponse<T> {
        self.body
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
