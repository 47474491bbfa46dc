//! Interval loop driving the sweeper.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use super::report::SweepReport;
use super::sweeper::HidingSweeper;

/// Run a sweep immediately and then once per `interval` until `shutdown`
/// flips to `true` or its sender is dropped. A sweep in progress always
/// completes. Returns the number of sweeps run.
pub async fn run_periodic<F>(
    sweeper: HidingSweeper,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
    mut on_report: F,
) -> usize
where
    F: FnMut(&SweepReport),
{
    let mut ticker = tokio::time::interval(interval);
    // A sweep that overruns the period should not trigger a burst of catch-up sweeps.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut runs = 0usize;
    loop {
        if *shutdown.borrow() {
            break;
        }
        tokio::select! {
            _ = ticker.tick() => {
                let report = sweeper.sweep().await;
                runs += 1;
                on_report(&report);
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    tracing::debug!("Sweep scheduler stopped after {} runs", runs);
    runs
}
