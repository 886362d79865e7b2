//! Route definitions and router construction.
//!
//! # Path Parameter Syntax
//! Axum 0.8 uses brace syntax for path parameters: `{job_id}`

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::bootstrap::{AxumContext, CorsConfig};
use crate::error::{api_panic_response, page_panic_response};
use crate::handlers;
use crate::state::AppState;

/// Build CORS layer from configuration.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    match config {
        CorsConfig::AllowAll => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsConfig::AllowOrigins(origins) => {
            use axum::http::HeaderValue;
            let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

/// HTML pages, file serving and the health check.
fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::form::index))
        .route("/download", post(handlers::form::submit))
        .route("/files/{job_id}", get(handlers::files::serve))
        .route("/health", get(health_check))
}

/// JSON API routes, without the `/api` prefix.
pub(crate) fn api_routes() -> Router<AppState> {
    Router::new().route("/downloads", post(handlers::api::create))
}

/// Create the main router from a context.
pub fn create_router(ctx: AxumContext, cors_config: &CorsConfig) -> Router {
    router_with_state(Arc::new(ctx), cors_config)
}

/// Create the main router around already shared state.
///
/// The caller keeps its own handle to the state, e.g. to shut the
/// janitor down after the server stops.
pub fn router_with_state(state: AppState, cors_config: &CorsConfig) -> Router {
    assemble(page_routes(), api_routes(), state, cors_config)
}

/// Panics in a handler become a 500: the form page for HTML routes and the
/// JSON error body under `/api`.
fn assemble(
    pages: Router<AppState>,
    api: Router<AppState>,
    state: AppState,
    cors_config: &CorsConfig,
) -> Router {
    let cors = build_cors_layer(cors_config);

    Router::new()
        .merge(pages.layer(CatchPanicLayer::custom(page_panic_response)))
        .nest(
            "/api",
            api.layer(CatchPanicLayer::custom(api_panic_response))
                .layer(cors),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Health check endpoint.
pub(crate) async fn health_check() -> &'static str {
    "OK"
}
