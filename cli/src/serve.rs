//! `mesa serve` - run the ordering API over the snapshot file.

use crate::config::Config;
use anyhow::{Context, Result};
use mesa_http::{ApiState, HttpIngress};
use mesa_runtime::{BoardEvent, OrderBoard};
use mesa_store::{MemoryStore, OrderStore, Snapshot};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub fn run_serve_command(config: &Config) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
    runtime.block_on(serve(config))
}

async fn serve(config: &Config) -> Result<()> {
    let store = Arc::new(open_store(config)?);

    // Kitchen bell: log every new pending order the board sees.
    let (events, mut bell) = mpsc::channel(16);
    let feed = store.subscribe_orders();
    tokio::spawn(async move { OrderBoard::new().follow(feed, events).await });
    tokio::spawn(async move {
        while let Some(BoardEvent::NewOrder(order)) = bell.recv().await {
            tracing::info!(
                number = %order.number,
                customer = %order.customer.name,
                total = %order.total,
                "new order received"
            );
        }
    });

    HttpIngress::new(ApiState::new(store.clone()))
        .bind(config.bind.as_str())
        .drain_timeout(Duration::from_secs(config.drain_timeout_secs))
        .run()
        .await
        .context("HTTP ingress failed")?;

    store
        .export()
        .save(&config.snapshot)
        .with_context(|| format!("Failed to save snapshot: {}", config.snapshot.display()))?;
    tracing::info!(path = %config.snapshot.display(), "snapshot saved");
    Ok(())
}

/// The snapshot file when it exists, an empty store otherwise.
pub fn open_store(config: &Config) -> Result<MemoryStore> {
    if !config.snapshot.exists() {
        tracing::warn!(
            path = %config.snapshot.display(),
            "no snapshot found, starting empty; run `mesa seed` for demo data"
        );
        return Ok(MemoryStore::new());
    }
    let snapshot = Snapshot::load(&config.snapshot)
        .with_context(|| format!("Failed to load snapshot: {}", config.snapshot.display()))?;
    tracing::info!(
        path = %config.snapshot.display(),
        products = snapshot.products.len(),
        orders = snapshot.orders.len(),
        "snapshot loaded"
    );
    Ok(MemoryStore::from_snapshot(snapshot))
}
