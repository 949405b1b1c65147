pub mod greeting;
pub mod health;

use axum::Router;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /hello                 plain string in, greeting out
/// /greet                 validated greeting request
/// /echo                  any shape in, same shape out
/// /fail                  always fails (exercises the server-error envelope)
/// ```
pub fn api_routes() -> Router {
    Router::new().merge(greeting::router())
}
