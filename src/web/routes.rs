//! Route definitions

use super::handlers;
use super::state::AppState;
use axum::{routing::get, Router};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        // Pages
        .route("/", get(handlers::index))
        .route("/search", get(handlers::search))
        // API routes
        .route("/api/gyms/featured", get(handlers::featured))
        .route("/api/facilities", get(handlers::facilities))
        .route("/health", get(handlers::health));

    if state.settings.general.enable_metrics {
        router = router.route("/stats", get(handlers::stats));
    }

    router
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
