//! API Router configuration

use super::handlers;
use super::state::AppState;
use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    let enable_cors = state.enable_cors;

    let router = Router::new()
        // Health
        .route("/health", get(handlers::health_check))
        // Catalog
        .route("/", get(handlers::landing))
        .route("/products", get(handlers::products))
        .route("/api/items", get(handlers::list_items))
        .route("/api/items/:id", get(handlers::get_item))
        // Faults
        .route("/api/faults/:name", get(handlers::trigger_fault))
        .layer(TraceLayer::new_for_http());

    let router = if enable_cors {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    };

    router.with_state(state)
}
