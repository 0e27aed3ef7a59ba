use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::core::client::azure::ResolveOutcome;
use crate::core::store::price_store::PriceStore;

/// Sole consumer of worker results and sole writer of the price store.
/// Failed lookups are logged and skipped; the key keeps its last known
/// value until a later tick succeeds. Exits when every worker has hung up.
pub async fn run(store: Arc<PriceStore>, mut results: mpsc::Receiver<ResolveOutcome>) {
    while let Some(outcome) = results.recv().await {
        match outcome {
            Ok(items) => {
                for item in &items {
                    store.set(item);
                }
                debug!(records = items.len(), "price store updated");
            }
            Err(e) if e.is_empty_result() => warn!("{e}"),
            Err(e) => error!("price lookup failed: {e}"),
        }
    }
    debug!("results channel closed, aggregator stopping");
}
