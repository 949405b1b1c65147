//! The seam between action invokers and whatever runs the action.
//!
//! An [`Action`] is anything that takes an input and eventually answers with
//! an [`ApiResponse`]: an in-process server action, a remote route reached
//! over HTTP, or a plain async closure wrapped with [`action_fn`].

use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;

use crate::response::ApiResponse;

/// A callable action that always answers with an envelope body.
///
/// Implementations must not fail outside the envelope: transport errors,
/// handler errors and validation errors all come back as
/// [`ApiResponse::Error`].
#[async_trait]
pub trait Action: Send + Sync {
    type Input: Send + 'static;
    type Output: Send + 'static;

    async fn call(&self, input: Self::Input) -> ApiResponse<Self::Output>;
}

/// Adapter turning an async closure into an [`Action`].
pub struct FnAction<F, I, O> {
    f: F,
    _marker: PhantomData<fn(I) -> O>,
}

/// Wrap `f` as an [`Action`].
pub fn action_fn<F, Fut, I, O>(f: F) -> FnAction<F, I, O>
where
    F: Fn(I) -> Fut + Send + Sync,
    Fut: Future<Output = ApiResponse<O>> + Send,
{
    FnAction {
        f,
        _marker: PhantomData,
    }
}

#[async_trait]
impl<F, Fut, I, O> Action for FnAction<F, I, O>
where
    F: Fn(I) -> Fut + Send + Sync,
    Fut: Future<Output = ApiResponse<O>> + Send,
    I: Send + 'static,
    O: Send + 'static,
{
    type Input = I;
    type Output = O;

    async fn call(&self, input: I) -> ApiResponse<O> {
        (self.f)(input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn closure_action_answers_with_its_envelope() {
        let action = action_fn(|name: String| async move {
            ApiResponse::success(format!("Hello, {name}!"))
        });

        let response = action.call("world".to_string()).await;
        assert_eq!(response, ApiResponse::success("Hello, world!".to_string()));
    }
}
