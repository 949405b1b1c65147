//! Client-side invocation of server actions.
//!
//! An [`ActionInvoker`] wraps one [`Action`](vergestack_core::Action) and
//! tracks its lifecycle (`idle → pending → success | error`), publishing
//! every [`ActionState`] change on a watch channel for a UI layer. Lifecycle
//! callbacks come from an ambient [`ApiProvider`] and can be overridden per
//! invoker with [`ActionOptions`].

pub mod http;
pub mod invoker;
pub mod options;
pub mod provider;
pub mod state;

pub use http::{ClientError, HttpAction};
pub use invoker::ActionInvoker;
pub use options::ActionOptions;
pub use provider::ApiProvider;
pub use state::ActionState;
