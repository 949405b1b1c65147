//! The action invoker state machine.
//!
//! `idle → pending → {success | error}`, then pending again on the next
//! invocation. Overlapping invocations are allowed: each start resets the
//! state, and only the most recently started invocation may write an
//! outcome. Older results are stale; they still fire `on_complete` so
//! every invocation completes exactly once.
//!
//! An action that panics counts as a failed invocation with the generic
//! error. An invocation whose future is dropped before the action answers
//! is cancelled: state returns to idle (if it is still the latest) and
//! `on_complete` fires.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use serde::Serialize;
use tokio::sync::watch;
use vergestack_core::{Action, ApiResponse, FieldError};

use crate::options::{ActionOptions, CompleteCallback};
use crate::provider::ApiProvider;
use crate::state::ActionState;

/// Tracks lifecycle state for one action and runs its callbacks.
///
/// `execute` takes `&self`, so an invoker shared behind an `Arc` (or
/// borrowed by several futures) can have invocations in flight at once.
pub struct ActionInvoker<A: Action> {
    action: A,
    provider: ApiProvider,
    options: ActionOptions<A::Output>,
    state: watch::Sender<ActionState<A::Output>>,
    /// Sequence number of the latest started invocation. Only changed while
    /// the state channel is locked.
    latest: AtomicU64,
}

impl<A> ActionInvoker<A>
where
    A: Action,
    A::Output: Clone + Serialize + Sync,
{
    /// Invoker without ambient callbacks.
    pub fn new(action: A) -> Self {
        Self::with_provider(action, ApiProvider::default(), ActionOptions::new())
    }

    /// Invoker with its own callbacks and no ambient ones.
    pub fn with_options(action: A, options: ActionOptions<A::Output>) -> Self {
        Self::with_provider(action, ApiProvider::default(), options)
    }

    pub(crate) fn with_provider(
        action: A,
        provider: ApiProvider,
        options: ActionOptions<A::Output>,
    ) -> Self {
        let (state, _) = watch::channel(ActionState::idle());
        Self {
            action,
            provider,
            options,
            state,
            latest: AtomicU64::new(0),
        }
    }

    /// Receiver that observes every state change, for a UI layer.
    pub fn subscribe(&self) -> watch::Receiver<ActionState<A::Output>> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ActionState<A::Output> {
        self.state.borrow().clone()
    }

    pub fn data(&self) -> Option<A::Output> {
        self.state.borrow().data.clone()
    }

    pub fn errors(&self) -> Option<Vec<FieldError>> {
        self.state.borrow().errors.clone()
    }

    pub fn is_pending(&self) -> bool {
        self.state.borrow().is_pending
    }

    /// Invoke the action.
    ///
    /// Sets pending and fires `on_start`; once the action answers, records
    /// the outcome, fires `on_complete` and then `on_success` or `on_error`.
    /// The response is also returned to the caller.
    pub async fn execute(&self, input: A::Input) -> ApiResponse<A::Output> {
        // Resolved per call so the merge always reflects the current options.
        let callbacks = self.options.resolve(self.provider.options());

        let mut sequence = 0;
        self.state.send_modify(|state| {
            sequence = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
            *state = ActionState::pending();
        });
        tracing::debug!(sequence, "Action started");
        if let Some(on_start) = &callbacks.on_start {
            on_start();
        }

        let cancel = CancelGuard {
            state: &self.state,
            latest: &self.latest,
            sequence,
            on_complete: callbacks.on_complete.clone(),
            armed: true,
        };
        let response = AssertUnwindSafe(self.action.call(input))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| {
                tracing::error!(sequence, "Action panicked");
                ApiResponse::internal_error()
            });
        cancel.disarm();

        let applied = self.state.send_if_modified(|state| {
            if self.latest.load(Ordering::SeqCst) != sequence {
                return false;
            }
            *state = match &response {
                ApiResponse::Success { data } => ActionState::succeeded(data.clone()),
                ApiResponse::Error { errors } => ActionState::failed(errors.clone()),
            };
            true
        });

        if let Some(on_complete) = &callbacks.on_complete {
            on_complete();
        }

        if !applied {
            tracing::debug!(sequence, "Discarding stale action result");
            return response;
        }

        match &response {
            ApiResponse::Success { data } => {
                tracing::debug!(sequence, "Action succeeded");
                if let Some(on_success) = &callbacks.on_success {
                    on_success(data);
                }
            }
            ApiResponse::Error { errors } => {
                tracing::debug!(sequence, error_count = errors.len(), "Action failed");
                if let Some(on_error) = &callbacks.on_error {
                    on_error(errors);
                }
            }
        }

        response
    }
}

/// Completes an invocation whose future is dropped mid-flight.
struct CancelGuard<'a, T> {
    state: &'a watch::Sender<ActionState<T>>,
    latest: &'a AtomicU64,
    sequence: u64,
    on_complete: Option<CompleteCallback>,
    armed: bool,
}

impl<T> CancelGuard<'_, T> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<T> Drop for CancelGuard<'_, T> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        tracing::debug!(sequence = self.sequence, "Action cancelled");
        self.state.send_if_modified(|state| {
            if self.latest.load(Ordering::SeqCst) != self.sequence {
                return false;
            }
            *state = ActionState::idle();
            true
        });
        if let Some(on_complete) = &self.on_complete {
            on_complete();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
