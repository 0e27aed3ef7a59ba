use std::sync::Arc;

use crate::core::config::AppConfig;
use crate::core::store::price_store::PriceStore;

/// Shared handles cloned into every request handler. The store is the
/// same instance the aggregator writes to.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub price_store: Arc<PriceStore>,
}
