//! Server actions: the route pipeline without the HTTP layer.
//!
//! A [`ServerAction`] is called in-process with a typed input and answers
//! with the envelope body directly. It implements
//! [`vergestack_core::Action`], so client-side invokers can drive it the
//! same way they drive a remote route.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use vergestack_core::{Action, ApiResponse, Schema};

use crate::builder::RouteConfig;

/// A schema-checked handler callable without a request.
pub struct ServerAction<I, O, H> {
    config: Arc<RouteConfig<I, O, H>>,
}

/// Build a [`ServerAction`] directly from its parts.
pub fn wrap_action<I, O, H, Fut, R, E>(input: I, output: O, handler: H) -> ServerAction<I, O, H>
where
    I: Schema,
    O: Schema,
    H: Fn(I::Output) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send,
{
    ServerAction::from_config(RouteConfig {
        input,
        output,
        handler,
    })
}

impl<I, O, H> ServerAction<I, O, H> {
    pub(crate) fn from_config(config: RouteConfig<I, O, H>) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl<I, O, H, Fut, R, E> ServerAction<I, O, H>
where
    I: Schema,
    O: Schema,
    H: Fn(I::Output) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send,
    R: Serialize + Send,
    E: Display + Send,
{
    /// Run the action on an untyped JSON input.
    pub async fn call_raw(&self, raw: Value) -> ApiResponse<O::Output> {
        self.config.run(raw).await.into_body()
    }
}

#[async_trait]
impl<I, O, H, Fut, R, E> Action for ServerAction<I, O, H>
where
    I: Schema,
    I::Output: Serialize,
    O: Schema,
    H: Fn(I::Output) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send,
    R: Serialize + Send,
    E: Display + Send,
{
    type Input = I::Output;
    type Output = O::Output;

    /// Serialize `input` and run it through the input schema, so rules
    /// declared on the input type are enforced in-process too.
    async fn call(&self, input: I::Output) -> ApiResponse<O::Output> {
        match serde_json::to_value(&input) {
            Ok(raw) => self.call_raw(raw).await,
            Err(err) => {
                tracing::error!(error = %err, "Action input is not serializable");
                ApiResponse::internal_error()
            }
        }
    }
}

impl<I, O, H> Clone for ServerAction<I, O, H> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;
    use validator::Validate;
    use vergestack_core::{typed, validated, FieldError};

    use super::*;
    use crate::builder::create_action;

    #[derive(Debug, Serialize, Deserialize, Validate)]
    struct Rename {
        #[validate(length(min = 3, message = "Name is too short"))]
        name: String,
    }

    async fn rename(input: Rename) -> anyhow::Result<String> {
        Ok(format!("renamed to {}", input.name))
    }

    #[tokio::test]
    async fn typed_call_succeeds() {
        let action = create_action()
            .input(validated::<Rename>())
            .output(typed::<String>())
            .handler(rename);

        let response = action.call(Rename { name: "Grace".into() }).await;
        assert_eq!(response, ApiResponse::success("renamed to Grace".to_string()));
    }

    #[tokio::test]
    async fn typed_call_still_enforces_rules() {
        let action = create_action()
            .input(validated::<Rename>())
            .output(typed::<String>())
            .handler(rename);

        let response = action.call(Rename { name: "Al".into() }).await;
        assert_eq!(
            response,
            ApiResponse::error(vec![FieldError::new("name", "Name is too short")])
        );
    }

    #[tokio::test]
    async fn failing_action_hides_cause() {
        let action = wrap_action(typed::<String>(), typed::<String>(), |_: String| async {
            Err::<String, _>(anyhow::anyhow!("upstream timeout at 10.0.0.7"))
        });

        let response = action.call_raw(json!("world")).await;
        assert_eq!(response, ApiResponse::internal_error());
    }
}
