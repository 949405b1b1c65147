//! Fluent, immutable configuration for routes and server actions.
//!
//! Each step consumes the builder and returns a new value, so a partial
//! configuration can be cloned and branched without shared state:
//!
//! ```ignore
//! let base = create_route().input(validated::<GreetInput>());
//! let plain = base.clone().handler(greet);
//! let checked = base.output(typed::<String>()).handler(greet);
//! ```
//!
//! Both schema slots start out as [`Any`], so `handler` always has two
//! resolved schemas to work with.

use std::fmt::Display;
use std::future::Future;
use std::marker::PhantomData;

use serde::Serialize;
use serde_json::Value;
use vergestack_core::{execute, Any, Envelope, Schema};

use crate::action::ServerAction;
use crate::route::Route;

// ---------------------------------------------------------------------------
// RouteConfig
// ---------------------------------------------------------------------------

/// A fully resolved input schema, output schema and handler.
///
/// Shared by [`Route`] and [`ServerAction`] behind an `Arc`.
#[derive(Debug)]
pub struct RouteConfig<I, O, H> {
    pub input: I,
    pub output: O,
    pub handler: H,
}

impl<I, O, H, Fut, R, E> RouteConfig<I, O, H>
where
    I: Schema,
    O: Schema,
    H: Fn(I::Output) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send,
    R: Serialize + Send,
    E: Display + Send,
{
    /// Run the configured pipeline on an already-decoded JSON value.
    pub async fn run(&self, raw: Value) -> Envelope<O::Output> {
        execute(&self.input, &self.output, &self.handler, raw).await
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Marker: the builder finishes into a [`Route`].
#[derive(Debug, Clone, Copy)]
pub struct ForRoute;

/// Marker: the builder finishes into a [`ServerAction`].
#[derive(Debug, Clone, Copy)]
pub struct ForAction;

/// Accumulates an input and an output schema.
pub struct Builder<I, O, K> {
    input: I,
    output: O,
    _kind: PhantomData<fn() -> K>,
}

pub type RouteBuilder<I = Any, O = Any> = Builder<I, O, ForRoute>;
pub type ActionBuilder<I = Any, O = Any> = Builder<I, O, ForAction>;

/// Start configuring an HTTP route.
pub fn create_route() -> RouteBuilder {
    Builder::new()
}

/// Start configuring an in-process server action.
pub fn create_action() -> ActionBuilder {
    Builder::new()
}

impl<K> Builder<Any, Any, K> {
    fn new() -> Self {
        Self {
            input: Any,
            output: Any,
            _kind: PhantomData,
        }
    }
}

impl<I, O, K> Builder<I, O, K>
where
    I: Schema,
    O: Schema,
{
    /// Replace the input schema.
    pub fn input<J: Schema>(self, schema: J) -> Builder<J, O, K> {
        Builder {
            input: schema,
            output: self.output,
            _kind: PhantomData,
        }
    }

    /// Replace the output schema.
    pub fn output<P: Schema>(self, schema: P) -> Builder<I, P, K> {
        Builder {
            input: self.input,
            output: schema,
            _kind: PhantomData,
        }
    }

    fn finish<H>(self, handler: H) -> RouteConfig<I, O, H> {
        RouteConfig {
            input: self.input,
            output: self.output,
            handler,
        }
    }
}

impl<I, O> Builder<I, O, ForRoute>
where
    I: Schema,
    O: Schema,
{
    /// Terminal step: wrap `handler` into an axum-mountable [`Route`].
    pub fn handler<H, Fut, R, E>(self, handler: H) -> Route<I, O, H>
    where
        H: Fn(I::Output) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send,
    {
        Route::from_config(self.finish(handler))
    }
}

impl<I, O> Builder<I, O, ForAction>
where
    I: Schema,
    O: Schema,
{
    /// Terminal step: wrap `handler` into a [`ServerAction`].
    pub fn handler<H, Fut, R, E>(self, handler: H) -> ServerAction<I, O, H>
    where
        H: Fn(I::Output) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send,
    {
        ServerAction::from_config(self.finish(handler))
    }
}

impl<I: Clone, O: Clone, K> Clone for Builder<I, O, K> {
    fn clone(&self) -> Self {
        Self {
            input: self.input.clone(),
            output: self.output.clone(),
            _kind: PhantomData,
        }
    }
}

impl<I: std::fmt::Debug, O: std::fmt::Debug, K> std::fmt::Debug for Builder<I, O, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builder")
            .field("input", &self.input)
            .field("output", &self.output)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;
    use vergestack_core::{typed, ApiResponse};

    use super::*;

    async fn greet(name: String) -> anyhow::Result<String> {
        Ok(format!("Hello, {name}!"))
    }

    #[tokio::test]
    async fn defaults_accept_any_shape() {
        let route = create_route().handler(|v: Value| async move { Ok::<_, anyhow::Error>(v) });

        let envelope = route.config().run(json!({ "free": ["form"] })).await;
        assert_eq!(envelope.body, ApiResponse::success(json!({ "free": ["form"] })));
    }

    #[tokio::test]
    async fn branches_do_not_share_configuration() {
        let base = create_route().input(typed::<String>());
        let strict = base.clone().output(typed::<u32>()).handler(greet);
        let loose = base.handler(greet);

        let strict_envelope = strict.config().run(json!("world")).await;
        let loose_envelope = loose.config().run(json!("world")).await;

        // Only the branch that narrowed its output schema rejects the string.
        assert_eq!(strict_envelope.body, ApiResponse::internal_error());
        assert_eq!(loose_envelope.body, ApiResponse::success(json!("Hello, world!")));
    }

    #[tokio::test]
    async fn later_schema_replaces_earlier_one() {
        let action = create_action()
            .input(typed::<u32>())
            .input(typed::<String>())
            .handler(greet);

        let response = action.call_raw(json!("again")).await;
        assert_eq!(response, ApiResponse::success(json!("Hello, again!")));
    }
}
