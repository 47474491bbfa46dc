//! Sweep and daemon commands.

use std::sync::Arc;
use std::time::Duration;

use console::style;
use tokio::sync::watch;

use private_topics::config::Settings;
use private_topics::sweep::{run_periodic, HidingSweeper};

use crate::cli::helpers::{open_host, open_visibility_cache, print_report};

async fn build_sweeper(settings: Arc<Settings>) -> anyhow::Result<HidingSweeper> {
    let stores = open_host(&settings).await?;
    let cache = open_visibility_cache(&settings).await?;
    Ok(HidingSweeper::new(settings, stores.topics, cache))
}

/// Run a single sweep.
pub async fn cmd_sweep(settings: Arc<Settings>, json: bool) -> anyhow::Result<()> {
    let sweeper = build_sweeper(settings).await?;
    let report = sweeper.sweep().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

/// Run sweeps on an interval until Ctrl-C.
pub async fn cmd_daemon(settings: Arc<Settings>, interval: Option<u64>) -> anyhow::Result<()> {
    let interval = interval
        .map(|secs| Duration::from_secs(secs.max(1)))
        .unwrap_or(settings.sweep_interval);
    let sweeper = build_sweeper(settings).await?;

    println!(
        "{} Running in daemon mode (interval: {}s)",
        style("→").cyan(),
        interval.as_secs()
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(run_periodic(sweeper, interval, shutdown_rx, print_report));

    tokio::signal::ctrl_c().await?;
    println!(
        "\n{} Interrupted, finishing current sweep",
        style("!").yellow()
    );
    let _ = shutdown_tx.send(true);

    let runs = handle.await?;
    println!("{} Stopped after {} sweeps", style("✓").green(), runs);
    Ok(())
}
