mod api;
mod app_state;
mod core;
mod errors;
mod routes;
mod scheduler;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::core::client::azure::{AzurePriceClient, PriceResolver};
use crate::core::store::price_store::PriceStore;

const LISTEN_ADDR: &str = "0.0.0.0:8080";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Arc::new(crate::core::config::load()?);
    info!(
        queries = config.resolve_prices_for.len(),
        workers = config.concurrency_level,
        interval_minutes = config.interval_in_minutes,
        "configuration loaded"
    );

    let store = Arc::new(PriceStore::new()?);
    let resolver: Arc<dyn PriceResolver> = Arc::new(AzurePriceClient::new()?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let pipeline = scheduler::spawn_pipeline(
        config.clone(),
        resolver,
        store.clone(),
        shutdown_rx.clone(),
    );

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown signal received");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => error!("failed to listen for shutdown signal: {e}"),
        }
    });

    let state = AppState {
        config,
        price_store: store,
    };
    let app = routes::app_router().with_state(state);

    let listener = tokio::net::TcpListener::bind(LISTEN_ADDR).await?;
    info!("listening on {}", listener.local_addr()?);

    let mut http_shutdown = shutdown_rx;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = http_shutdown.changed().await;
        })
        .await?;

    // The pipeline observes the same signal; wait for its tasks to wind down.
    for handle in pipeline {
        let _ = handle.await;
    }
    info!("shutdown complete");
    Ok(())
}
