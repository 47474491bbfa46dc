//! Batch hiding of topics in the configured category.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::report::{SweepReport, SweepSkip};
use crate::cache::BoxedVisibilityCache;
use crate::config::Settings;
use crate::models::Topic;
use crate::repository::TopicStore;

/// Hides qualifying topics in the sweep category, at most once per topic.
#[derive(Clone)]
pub struct HidingSweeper {
    settings: Arc<Settings>,
    topics: Arc<dyn TopicStore>,
    cache: BoxedVisibilityCache,
}

impl HidingSweeper {
    pub fn new(
        settings: Arc<Settings>,
        topics: Arc<dyn TopicStore>,
        cache: BoxedVisibilityCache,
    ) -> Self {
        Self {
            settings,
            topics,
            cache,
        }
    }

    /// Run one sweep. Never fails; problems are logged and counted.
    pub async fn sweep(&self) -> SweepReport {
        let category_id = self.settings.sweep_category;

        if !self.settings.enabled {
            debug!("Private topics disabled, skipping sweep");
            return SweepReport::skipped(category_id, SweepSkip::Disabled);
        }
        let Some(category_id) = category_id else {
            warn!("Private topics category is not configured.");
            return SweepReport::skipped(None, SweepSkip::Unconfigured);
        };

        let topics = match self.topics.topics_in_category(category_id).await {
            Ok(topics) => topics,
            Err(e) => {
                error!("Failed to list topics in category {}: {}", category_id, e);
                return SweepReport::skipped(Some(category_id), SweepSkip::FetchFailed);
            }
        };

        let mut report = SweepReport {
            category_id: Some(category_id),
            examined: topics.len(),
            ..Default::default()
        };

        for topic in &topics {
            self.process(topic, &mut report).await;
        }

        info!(
            category_id,
            examined = report.examined,
            hidden = report.hidden,
            failed = report.failed,
            "Sweep finished"
        );
        report
    }

    async fn process(&self, topic: &Topic, report: &mut SweepReport) {
        if self.settings.is_excluded(topic.id) {
            report.excluded += 1;
            return;
        }

        match self.cache.contains(topic.id).await {
            Ok(true) => {
                report.cached += 1;
                return;
            }
            Ok(false) => {}
            Err(e) => {
                error!("Error checking cache for topic {}: {}", topic.id, e);
                report.failed += 1;
                return;
            }
        }

        if !topic.is_hide_candidate() {
            if topic.pinned {
                report.pinned += 1;
            } else {
                report.already_hidden += 1;
            }
            return;
        }

        // Claim before writing so concurrent sweeps sharing the cache
        // attempt each topic once.
        match self.cache.mark_processed(topic.id).await {
            Ok(true) => {}
            Ok(false) => {
                debug!("Topic {} claimed by another sweep", topic.id);
                report.cached += 1;
                return;
            }
            Err(e) => {
                error!("Error marking topic {} in cache: {}", topic.id, e);
                report.failed += 1;
                return;
            }
        }

        match self.topics.set_hidden(topic.id, true).await {
            Ok(true) => {
                info!("Topic {} hidden successfully.", topic.id);
                report.hidden += 1;
            }
            Ok(false) => {
                debug!("Topic {} no longer exists", topic.id);
                report.missing += 1;
            }
            Err(e) => {
                error!("Error hiding topic {}: {}", topic.id, e);
                report.failed += 1;
                if let Err(e) = self.cache.unmark(topic.id).await {
                    error!("Failed to release cache entry for topic {}: {}", topic.id, e);
                }
            }
        }
    }
}
