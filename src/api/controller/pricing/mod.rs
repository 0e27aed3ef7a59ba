//! Pricing controller: renders the price store for scrapers

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;

use crate::app_state::AppState;
use crate::errors::{internal_error, AppError};

pub struct PricingController;

impl PricingController {
    /// Prometheus text exposition of every collected price.
    pub async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
        let body = state.price_store.render().map_err(internal_error)?;
        Ok((
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        ))
    }
}
