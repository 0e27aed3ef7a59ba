use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use tower_http::cors::CorsLayer;

use crate::api::controller::pricing::PricingController;
use crate::api::controller::system::SystemController;
use crate::app_state::AppState;

/// Build the main application router
pub fn app_router() -> Router<AppState> {
    Router::new()
        // Root route
        .route("/", get(SystemController::welcome))
        // Health probes
        .route("/live", get(SystemController::live))
        .route("/ready", get(SystemController::ready))
        // Loaded configuration, read-only
        .route("/config", get(SystemController::config))
        // Scrape endpoint for the collected prices
        .route("/metrics/pricing/azure", get(PricingController::metrics))
        // Fallback handler for 404
        .fallback(handler_404)
        .layer(CorsLayer::very_permissive())
}

// Handler for 404 Not Found
async fn handler_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        "The requested resource was not found",
    )
}
