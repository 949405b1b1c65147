//! Framework-independent building blocks for validated routes and actions.
//!
//! Holds the response envelope, field errors, the [`Schema`](schema::Schema)
//! abstraction over `serde` + `validator`, the shared [`execute`] pipeline
//! and the [`Action`](action::Action) seam used by client-side invokers.

pub mod action;
pub mod error;
pub mod execute;
pub mod response;
pub mod schema;

pub use action::{action_fn, Action, FnAction};
pub use error::CoreError;
pub use execute::execute;
pub use response::{ApiResponse, Envelope, FieldError, GENERIC_ERROR_MESSAGE};
pub use schema::{any, typed, validated, Any, Schema, Typed, Validated};
