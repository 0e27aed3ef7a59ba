//! Collection pipeline: scheduler -> worker pool -> resolver -> aggregator.

pub mod aggregator;
pub mod ticker;
pub mod worker;

use std::sync::Arc;

use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::info;

use crate::core::client::azure::PriceResolver;
use crate::core::config::AppConfig;
use crate::core::store::price_store::PriceStore;

/// Wires up and spawns the whole pipeline. Both channels are bounded to
/// the worker count, so backpressure flows from a slow pool all the way
/// back to the scheduler's blocking enqueue; nothing is ever dropped.
/// Cancellation is cooperative: the shared watch signal is observed at
/// every blocking point, and channel closure cascades the rest.
pub fn spawn_pipeline(
    config: Arc<AppConfig>,
    resolver: Arc<dyn PriceResolver>,
    store: Arc<PriceStore>,
    shutdown: watch::Receiver<bool>,
) -> Vec<JoinHandle<()>> {
    let depth = config.concurrency_level;
    let (job_tx, job_rx) = mpsc::channel(depth);
    let (result_tx, result_rx) = mpsc::channel(depth);
    let job_rx = Arc::new(Mutex::new(job_rx));

    let mut handles = Vec::with_capacity(depth + 2);

    for id in 0..depth {
        handles.push(tokio::spawn(worker::run(
            id,
            resolver.clone(),
            job_rx.clone(),
            result_tx.clone(),
            shutdown.clone(),
        )));
    }
    // Workers hold the only result senders; when the last worker exits the
    // aggregator drains and stops on its own.
    drop(result_tx);

    handles.push(tokio::spawn(aggregator::run(store, result_rx)));
    handles.push(tokio::spawn(ticker::run(config.clone(), job_tx, shutdown)));

    info!(
        workers = depth,
        queries = config.resolve_prices_for.len(),
        interval_minutes = config.interval_in_minutes,
        "price collection pipeline started"
    );
    handles
}
