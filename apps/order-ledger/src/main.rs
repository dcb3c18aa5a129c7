//! Order Ledger Binary
//!
//! Replays a recorded venue feed through the reconciliation loop.
//!
//! # Usage
//!
//! ```bash
//! order-ledger [config.yaml]
//! ```
//!
//! The config path defaults to `config.yaml`. Values may reference
//! environment variables as `${VAR}` or `${VAR:-default}`.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: overrides `observability.logging.level`

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use order_ledger::config::{Config, load_config};
use order_ledger::infrastructure::feed::ReplayFeed;
use order_ledger::infrastructure::observer::TracingObserver;
use order_ledger::infrastructure::persistence::InMemoryLedgerStore;
use order_ledger::observability::{MetricsConfig, init_metrics, init_tracing};
use order_ledger::ReconciliationLoop;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1);
    let config = load_config(config_path.as_deref()).context("loading configuration")?;

    init_tracing(&config.observability.logging).context("initializing tracing")?;

    if let Some(port) = config.observability.metrics_port {
        init_metrics(&MetricsConfig::with_port(port)).context("starting metrics exporter")?;
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        instrument = %config.feed.instrument,
        "Starting order ledger"
    );

    run(&config).await
}

async fn run(config: &Config) -> anyhow::Result<()> {
    let settings = config.loop_settings()?;
    let store = Arc::new(open_store(config)?);

    let replay_path = config
        .feed
        .replay_path
        .as_deref()
        .context("feed.replay_path is required")?;
    let feed = ReplayFeed::from_path(Path::new(replay_path))
        .with_context(|| format!("opening replay feed '{replay_path}'"))?;

    let observer = Arc::new(TracingObserver::new(config.feed.instrument.clone()));
    let mut ledger_loop = ReconciliationLoop::new(feed, Arc::clone(&store), observer, settings);

    let result = ledger_loop.run().await;
    save_store(config, &store);

    let summary = result.context("reconciliation loop halted")?;
    tracing::info!(
        cycles = summary.cycles,
        timeouts = summary.timeouts,
        reconciled = summary.reconciled,
        failed = summary.failed_events,
        submitted = summary.submitted.len(),
        "Order ledger stopped"
    );
    Ok(())
}

fn open_store(config: &Config) -> anyhow::Result<InMemoryLedgerStore> {
    let Some(path) = config.persistence.snapshot_path.as_deref().map(Path::new) else {
        return Ok(InMemoryLedgerStore::new());
    };
    if !path.exists() {
        tracing::info!(path = %path.display(), "No ledger snapshot, starting empty");
        return Ok(InMemoryLedgerStore::new());
    }

    let store = InMemoryLedgerStore::load_json(path)
        .with_context(|| format!("loading ledger snapshot '{}'", path.display()))?;
    tracing::info!(
        path = %path.display(),
        orders = store.order_count()?,
        "Ledger snapshot loaded"
    );
    Ok(store)
}

fn save_store(config: &Config, store: &InMemoryLedgerStore) {
    let Some(path) = config.persistence.snapshot_path.as_deref().map(Path::new) else {
        return;
    };
    match store.save_json(path) {
        Ok(()) => tracing::info!(path = %path.display(), "Ledger snapshot saved"),
        Err(e) => tracing::error!(path = %path.display(), error = %e, "Failed to save ledger snapshot"),
    }
}
