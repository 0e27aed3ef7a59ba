use std::sync::Arc;

use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, info};

use crate::core::client::azure::{PriceResolver, ResolveOutcome};
use crate::core::config::PriceQuery;

/// One worker of the fixed-size pool. Pulls queries off the shared job
/// queue, resolves them, and pushes the outcome to the aggregator. An
/// in-flight resolver call is never interrupted on shutdown; it finishes
/// or times out on its own, and the loop exits at the next wait.
pub async fn run(
    id: usize,
    resolver: Arc<dyn PriceResolver>,
    jobs: Arc<Mutex<mpsc::Receiver<PriceQuery>>>,
    results: mpsc::Sender<ResolveOutcome>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        let query = {
            let mut jobs = jobs.lock().await;
            tokio::select! {
                // Shutdown always wins over pending work.
                biased;
                _ = shutdown.changed() => {
                    debug!(worker = id, "worker stopping");
                    return;
                }
                received = jobs.recv() => match received {
                    Some(query) => query,
                    None => {
                        debug!(worker = id, "job queue closed, worker stopping");
                        return;
                    }
                },
            }
        };

        info!(
            worker = id,
            sku = %query.arm_sku_name,
            location = %query.location,
            currency = %query.currency_code,
            "collecting prices"
        );
        let outcome = resolver.resolve(&query).await;

        tokio::select! {
            biased;
            _ = shutdown.changed() => {
                debug!(worker = id, "worker stopping before result delivery");
                return;
            }
            sent = results.send(outcome) => {
                if sent.is_err() {
                    // Aggregator gone; the pipeline is shutting down.
                    return;
                }
            }
        }
    }
}
