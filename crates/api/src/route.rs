//! Route wrapper: turns a schema-checked handler into an axum endpoint.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use axum::body::Bytes;
use axum::routing::{post, MethodRouter};
use serde::Serialize;
use serde_json::Value;
use vergestack_core::{Envelope, Schema};

use crate::builder::RouteConfig;
use crate::error::{AppError, AppResult};
use crate::response::JsonEnvelope;

/// A framework-compatible entry point built from a [`RouteConfig`].
///
/// Reads the raw request body, runs the validate → handle → validate
/// pipeline and always answers with a [`JsonEnvelope`]. Cheap to clone.
pub struct Route<I, O, H> {
    config: Arc<RouteConfig<I, O, H>>,
}

/// Build a [`Route`] directly from its parts.
pub fn wrap_route<I, O, H, Fut, R, E>(input: I, output: O, handler: H) -> Route<I, O, H>
where
    I: Schema,
    O: Schema,
    H: Fn(I::Output) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send,
{
    Route::from_config(RouteConfig {
        input,
        output,
        handler,
    })
}

impl<I, O, H> Route<I, O, H> {
    pub(crate) fn from_config(config: RouteConfig<I, O, H>) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &RouteConfig<I, O, H> {
        &self.config
    }
}

impl<I, O, H, Fut, R, E> Route<I, O, H>
where
    I: Schema,
    O: Schema,
    O::Output: Serialize,
    H: Fn(I::Output) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send,
    R: Serialize + Send,
    E: Display + Send,
{
    /// Handle one raw request body.
    pub async fn respond(&self, body: Bytes) -> Envelope<O::Output> {
        match decode_body(&body) {
            Ok(raw) => self.config.run(raw).await,
            Err(err) => err.into_envelope(),
        }
    }

    /// Mount the route as a `POST` endpoint.
    pub fn post<S>(self) -> MethodRouter<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        post(move |body: Bytes| {
            let route = self.clone();
            async move { JsonEnvelope(route.respond(body).await) }
        })
    }
}

impl<I, O, H> Clone for Route<I, O, H> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
        }
    }
}

/// Decode a request body. An empty body counts as JSON `null`.
fn decode_body(body: &[u8]) -> AppResult<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|err| {
        tracing::debug!(error = %err, "Request body is not valid JSON");
        AppError::BadRequest("Request body must be valid JSON".to_string())
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use vergestack_core::{typed, ApiResponse, FieldError};

    use super::*;

    async fn greet(name: String) -> anyhow::Result<String> {
        Ok(format!("Hello, {name}!"))
    }

    #[test]
    fn empty_body_decodes_as_null() {
        assert_eq!(decode_body(b"").unwrap(), Value::Null);
        assert_eq!(decode_body(b"  \n").unwrap(), Value::Null);
    }

    #[test]
    fn malformed_body_is_bad_request() {
        let err = decode_body(b"{ not json").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn respond_runs_greeting() {
        let route = wrap_route(typed::<String>(), typed::<String>(), greet);

        let envelope = route.respond(Bytes::from_static(b"\"world\"")).await;

        assert_eq!(envelope.status, StatusCode::OK);
        assert_eq!(envelope.body, ApiResponse::success("Hello, world!".to_string()));
    }

    #[tokio::test]
    async fn respond_rejects_malformed_json_without_calling_handler() {
        let route = wrap_route(typed::<String>(), typed::<String>(), |_: String| async {
            if true {
                panic!("handler must not run");
            }
            Ok::<String, anyhow::Error>(String::new())
        });

        let envelope = route.respond(Bytes::from_static(b"{")).await;

        assert_eq!(envelope.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            envelope.body,
            ApiResponse::error(vec![FieldError::general("Request body must be valid JSON")])
        );
    }
}
