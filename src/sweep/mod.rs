//! Sweep-based hiding.
//!
//! The sweeper scans one configured category and sets the hidden flag on
//! every topic that is not excluded, pinned, already hidden or already
//! recorded in the visibility cache. It is an optional batch mechanism on
//! top of read-time filtering; the scheduler runs it on a fixed interval.

mod report;
mod scheduler;
mod sweeper;

pub use report::{SweepReport, SweepSkip};
pub use scheduler::run_periodic;
pub use sweeper::HidingSweeper;

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::sync::{mpsc, watch};

    use super::*;
    use crate::cache::{BoxedVisibilityCache, InMemoryVisibilityCache, VisibilityCache};
    use crate::config::Settings;
    use crate::models::Topic;
    use crate::repository::InMemoryHost;

    fn build(settings: Settings) -> (InMemoryHost, BoxedVisibilityCache, HidingSweeper) {
        let host = InMemoryHost::new();
        let cache: BoxedVisibilityCache = Arc::new(InMemoryVisibilityCache::new());
        let sweeper = HidingSweeper::new(Arc::new(settings), Arc::new(host.clone()), cache.clone());
        (host, cache, sweeper)
    }

    #[tokio::test]
    async fn test_hides_eligible_topics_only() {
        let settings = Settings::enabled().with_sweep_category(5);
        let (host, cache, sweeper) = build(settings);
        host.insert_topic(Topic::new(1, Some(5), 10)).await;
        host.insert_topic(Topic::new(2, Some(5), 10).pinned()).await;
        host.insert_topic(Topic::new(3, Some(5), 10).hidden()).await;
        host.insert_topic(Topic::new(4, Some(6), 10)).await;

        let report = sweeper.sweep().await;
        assert!(report.ran());
        assert_eq!(report.examined, 3);
        assert_eq!(report.hidden, 1);
        assert_eq!(report.pinned, 1);
        assert_eq!(report.already_hidden, 1);

        assert!(host.topic(1).await.unwrap().hidden);
        assert!(!host.topic(2).await.unwrap().hidden);
        assert!(!host.topic(4).await.unwrap().hidden);
        assert!(cache.contains(1).await.unwrap());
        assert!(!cache.contains(2).await.unwrap());
        assert!(!cache.contains(3).await.unwrap());
    }

    #[tokio::test]
    async fn test_disabled_and_unconfigured_skip() {
        let (host, _cache, sweeper) = build(Settings::default().with_sweep_category(5));
        host.insert_topic(Topic::new(1, Some(5), 10)).await;
        let report = sweeper.sweep().await;
        assert_eq!(report.skipped, Some(SweepSkip::Disabled));
        assert!(!host.topic(1).await.unwrap().hidden);

        let (_host, _cache, sweeper) = build(Settings::enabled().with_sweep_category(0));
        let report = sweeper.sweep().await;
        assert_eq!(report.skipped, Some(SweepSkip::Unconfigured));
        assert_eq!(report.category_id, None);
    }

    #[tokio::test]
    async fn test_fetch_failure_reported() {
        let (host, _cache, sweeper) = build(Settings::enabled().with_sweep_category(5));
        host.set_unavailable(true).await;
        let report = sweeper.sweep().await;
        assert_eq!(report.skipped, Some(SweepSkip::FetchFailed));
    }

    #[tokio::test]
    async fn test_cached_topic_not_retried() {
        let (host, cache, sweeper) = build(Settings::enabled().with_sweep_category(5));
        host.insert_topic(Topic::new(1, Some(5), 10)).await;
        cache.mark_processed(1).await.unwrap();

        let report = sweeper.sweep().await;
        assert_eq!(report.cached, 1);
        assert_eq!(report.hidden, 0);
        assert_eq!(host.hide_attempts(1).await, 0);
    }

    #[tokio::test]
    async fn test_periodic_runs_until_shutdown() {
        let (host, _cache, sweeper) = build(Settings::enabled().with_sweep_category(5));
        host.insert_topic(Topic::new(1, Some(5), 10)).await;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (report_tx, mut report_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_periodic(
            sweeper,
            Duration::from_millis(10),
            shutdown_rx,
            move |report: &SweepReport| {
                let _ = report_tx.send(report.clone());
            },
        ));

        let first = report_rx.recv().await.unwrap();
        let second = report_rx.recv().await.unwrap();
        assert_eq!(first.hidden, 1);
        assert_eq!(second.hidden, 0);
        assert_eq!(second.cached, 1);

        shutdown_tx.send(true).unwrap();
        let runs = handle.await.unwrap();
        assert!(runs >= 2);
    }
}
