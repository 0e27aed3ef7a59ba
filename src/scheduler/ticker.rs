use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use crate::core::config::{AppConfig, PriceQuery};

/// Drives the collection cadence: the full configured set is enqueued once
/// immediately, then again on every interval tick. The job channel is
/// bounded, so a busy worker pool makes `send` wait here instead of
/// dropping queries; every wait is raced against the shutdown signal.
pub async fn run(
    config: Arc<AppConfig>,
    jobs: mpsc::Sender<PriceQuery>,
    mut shutdown: watch::Receiver<bool>,
) {
    // First tick completes immediately, covering the startup batch.
    let mut ticker = tokio::time::interval(config.interval());

    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => {
                info!("scheduler stopping");
                return;
            }
            _ = ticker.tick() => {
                debug!(queries = config.resolve_prices_for.len(), "scheduling price collection batch");
                for query in &config.resolve_prices_for {
                    tokio::select! {
                        biased;
                        _ = shutdown.changed() => {
                            info!("scheduler stopping mid-batch");
                            return;
                        }
                        sent = jobs.send(query.clone()) => {
                            if sent.is_err() {
                                // All workers gone; nothing left to schedule for.
                                return;
                            }
                        }
                    }
                }
            }
        }
    }
}
