use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use vergestack_core::Action;

use crate::invoker::ActionInvoker;
use crate::options::ActionOptions;

/// Scope-wide default callbacks shared by every invoker created from it.
///
/// Cheap to clone; clones share the same callbacks.
#[derive(Clone, Debug, Default)]
pub struct ApiProvider {
    options: Arc<ActionOptions<Value>>,
}

impl ApiProvider {
    pub fn new(options: ActionOptions<Value>) -> Self {
        Self {
            options: Arc::new(options),
        }
    }

    /// The ambient callbacks.
    pub fn options(&self) -> &ActionOptions<Value> {
        &self.options
    }

    /// Create an invoker that only uses the ambient callbacks.
    pub fn use_action<A>(&self, action: A) -> ActionInvoker<A>
    where
        A: Action,
        A::Output: Clone + Serialize + Sync,
    {
        self.use_action_with(action, ActionOptions::new())
    }

    /// Create an invoker whose `options` override the ambient callbacks.
    pub fn use_action_with<A>(&self, action: A, options: ActionOptions<A::Output>) -> ActionInvoker<A>
    where
        A: Action,
        A::Output: Clone + Serialize + Sync,
    {
        ActionInvoker::with_provider(action, self.clone(), options)
    }
}
