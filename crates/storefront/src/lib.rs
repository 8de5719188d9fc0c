//! Handicrafts Storefront library.
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod filters;
pub mod flash;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;

use axum::{Router, extract::Request, routing::get};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use config::StorefrontConfig;
pub use state::AppState;
pub use storage::FileStore;

/// Static assets, relative to the workspace root.
pub const STATIC_DIR: &str = "crates/storefront/static";

/// Build the full storefront router: pages, sessions, request ids, tracing.
///
/// Sentry layers are added by the binary so tests can drive this router
/// without a Sentry client.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(session_layer)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
