//! Route definitions for the greeting resource.

use axum::Router;
use vergestack_core::{typed, validated};

use crate::builder::create_route;
use crate::handlers::greeting::{self, GreetInput};

/// Routes mounted under `/api/v1`.
///
/// ```text
/// POST   /hello   -> greeting::hello   (string -> string)
/// POST   /greet   -> greeting::greet   (GreetInput -> Greeting)
/// POST   /echo    -> greeting::echo    (any -> any)
/// POST   /fail    -> greeting::fail    (string -> never succeeds)
/// ```
pub fn router() -> Router {
    Router::new()
        .route(
            "/hello",
            create_route()
                .input(typed::<String>())
                .output(typed::<String>())
                .handler(greeting::hello)
                .post(),
        )
        .route(
            "/greet",
            create_route()
                .input(validated::<GreetInput>())
                .output(validated::<greeting::Greeting>())
                .handler(greeting::greet)
                .post(),
        )
        .route("/echo", create_route().handler(greeting::echo).post())
        .route(
            "/fail",
            create_route()
                .input(typed::<String>())
                .handler(greeting::fail)
                .post(),
        )
}
