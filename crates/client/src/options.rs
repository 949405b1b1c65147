//! Lifecycle callbacks and their two-level resolution.
//!
//! Callbacks set on an invoker win over the same-named callbacks of the
//! ambient [`ApiProvider`](crate::ApiProvider). Unset callbacks are no-ops.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use vergestack_core::FieldError;

pub type StartCallback = Arc<dyn Fn() + Send + Sync>;
pub type SuccessCallback<T> = Arc<dyn Fn(&T) + Send + Sync>;
pub type ErrorCallback = Arc<dyn Fn(&[FieldError]) + Send + Sync>;
pub type CompleteCallback = Arc<dyn Fn() + Send + Sync>;

/// Optional lifecycle callbacks for one invoker, or for a provider when
/// `T` is [`serde_json::Value`].
pub struct ActionOptions<T> {
    pub on_start: Option<StartCallback>,
    pub on_success: Option<SuccessCallback<T>>,
    pub on_error: Option<ErrorCallback>,
    pub on_complete: Option<CompleteCallback>,
}

impl<T> ActionOptions<T> {
    pub fn new() -> Self {
        Self {
            on_start: None,
            on_success: None,
            on_error: None,
            on_complete: None,
        }
    }

    /// Fired when an invocation starts, after state switched to pending.
    pub fn on_start(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_start = Some(Arc::new(f));
        self
    }

    /// Fired with the data of a successful invocation.
    pub fn on_success(mut self, f: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Arc::new(f));
        self
    }

    /// Fired with the errors of a failed invocation.
    pub fn on_error(mut self, f: impl Fn(&[FieldError]) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(f));
        self
    }

    /// Fired once per invocation, whatever the outcome.
    pub fn on_complete(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Arc::new(f));
        self
    }
}

impl<T: Serialize + 'static> ActionOptions<T> {
    /// Merge with ambient callbacks, preferring each callback set here.
    ///
    /// An ambient `on_success` receives the data as JSON, since one provider
    /// serves actions of every output type.
    pub fn resolve(&self, ambient: &ActionOptions<Value>) -> ActionOptions<T> {
        ActionOptions {
            on_start: self.on_start.clone().or_else(|| ambient.on_start.clone()),
            on_success: self
                .on_success
                .clone()
                .or_else(|| ambient.on_success.clone().map(json_success)),
            on_error: self.on_error.clone().or_else(|| ambient.on_error.clone()),
            on_complete: self
                .on_complete
                .clone()
                .or_else(|| ambient.on_complete.clone()),
        }
    }
}

fn json_success<T: Serialize + 'static>(ambient: SuccessCallback<Value>) -> SuccessCallback<T> {
    Arc::new(move |data: &T| match serde_json::to_value(data) {
        Ok(value) => ambient(&value),
        Err(err) => {
            tracing::warn!(error = %err, "Skipping ambient on_success: data is not serializable");
        }
    })
}

impl<T> Default for ActionOptions<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ActionOptions<T> {
    fn clone(&self) -> Self {
        Self {
            on_start: self.on_start.clone(),
            on_success: self.on_success.clone(),
            on_error: self.on_error.clone(),
            on_complete: self.on_complete.clone(),
        }
    }
}

impl<T> fmt::Debug for ActionOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionOptions")
            .field("on_start", &self.on_start.is_some())
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}
