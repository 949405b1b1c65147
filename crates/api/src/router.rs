//! Shared application router builder.
//!
//! Provides [`build_app_router`] so both the production binary (`main.rs`)
//! and integration tests (`tests/common/mod.rs`) use the exact same
//! middleware stack.

use std::any::Any;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method};
use axum::response::{IntoResponse, Response};
use axum::{BoxError, Router};
use tower::timeout::error::Elapsed;
use tower::timeout::TimeoutLayer;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use vergestack_core::Envelope;

use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};
use crate::response::JsonEnvelope;
use crate::routes;

/// Build the full application [`Router`] with all middleware layers.
pub fn build_app_router(config: &ServerConfig) -> AppResult<Router> {
    let router = Router::new()
        // Health check at root level (not under /api/v1).
        .merge(routes::health::router())
        // API v1 routes.
        .nest("/api/v1", routes::api_routes());

    with_middleware(router, config)
}

/// Wrap `router` in the middleware stack, applied bottom-up:
///
/// 1. CORS
/// 2. Set request ID on incoming requests
/// 3. Structured request/response tracing
/// 4. Propagate request ID to response
/// 5. Request timeout
/// 6. Panic recovery
///
/// Timeouts and panics answer with the generic error envelope, like every
/// other server-side failure.
pub fn with_middleware(router: Router, config: &ServerConfig) -> AppResult<Router> {
    let cors = build_cors_layer(config)?;
    let request_id_header = HeaderName::from_static("x-request-id");

    Ok(router
        .layer(CatchPanicLayer::custom(panic_envelope))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(middleware_error_envelope))
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.request_timeout_secs,
                ))),
        )
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors))
}

async fn middleware_error_envelope(err: BoxError) -> JsonEnvelope<()> {
    if err.is::<Elapsed>() {
        tracing::warn!("Request timed out");
    } else {
        tracing::error!(error = %err, "Middleware error");
    }
    JsonEnvelope(Envelope::internal_error())
}

fn panic_envelope(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    };
    tracing::error!(panic = %detail, "Request panicked outside a wrapped route");
    JsonEnvelope(Envelope::<()>::internal_error()).into_response()
}

/// Build the CORS middleware layer from server configuration.
///
/// An unparsable origin is a configuration error, reported at startup.
pub fn build_cors_layer(config: &ServerConfig) -> AppResult<CorsLayer> {
    let origins = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .map_err(|e| AppError::Config(format!("Invalid CORS origin '{o}': {e}")))
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600)))
}
