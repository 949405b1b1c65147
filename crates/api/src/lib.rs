//! Validated axum routes and server actions.
//!
//! [`create_route`] and [`create_action`] start an immutable builder that
//! collects an input schema and an output schema before the terminal
//! `handler` call produces a [`Route`] or a [`ServerAction`]. Both run the
//! same validate → handle → validate pipeline and answer with the uniform
//! `{ status, data | errors }` envelope.

pub mod action;
pub mod builder;
pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod route;
pub mod router;
pub mod routes;

pub use action::{wrap_action, ServerAction};
pub use builder::{create_action, create_route, ActionBuilder, Builder, RouteBuilder, RouteConfig};
pub use route::{wrap_route, Route};
pub use vergestack_core::{any, typed, validated, ApiResponse, Envelope, FieldError, Schema};
