//! Conversion of the response envelope into an axum response.
//!
//! Every wrapped route answers through [`JsonEnvelope`], so the transport
//! layer only ever serializes one response type.

use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use vergestack_core::Envelope;

/// An [`Envelope`] sent as a JSON body with its status code.
#[derive(Debug)]
pub struct JsonEnvelope<T>(pub Envelope<T>);

impl<T: Serialize> IntoResponse for JsonEnvelope<T> {
    fn into_response(self) -> Response {
        let Envelope { status, body } = self.0;
        (status, Json(body)).into_response()
    }
}
