use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id::request_id_middleware;

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Achievement catalog
        .route("/achievements", get(handlers::get_catalog))
        // Per-user achievement state
        .route(
            "/users/:user_id/achievements",
            get(handlers::get_user_achievements),
        )
        .route(
            "/users/:user_id/achievements/upcoming",
            get(handlers::get_upcoming_achievements),
        )
        .route(
            "/users/:user_id/achievements/reconcile",
            post(handlers::reconcile_achievements),
        )
        // Metadata search
        .route("/search", get(handlers::search_titles))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
