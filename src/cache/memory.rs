//! In-memory visibility cache for single-process operation.
//!
//! State is not persisted across restarts.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::backend::{CacheResult, VisibilityCache};
use crate::models::TopicId;

/// In-memory visibility cache.
#[derive(Clone, Default)]
pub struct InMemoryVisibilityCache {
    topics: Arc<RwLock<HashSet<TopicId>>>,
}

impl InMemoryVisibilityCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VisibilityCache for InMemoryVisibilityCache {
    async fn contains(&self, topic_id: TopicId) -> CacheResult<bool> {
        Ok(self.topics.read().await.contains(&topic_id))
    }

    async fn mark_processed(&self, topic_id: TopicId) -> CacheResult<bool> {
        Ok(self.topics.write().await.insert(topic_id))
    }

    async fn unmark(&self, topic_id: TopicId) -> CacheResult<()> {
        self.topics.write().await.remove(&topic_id);
        Ok(())
    }

    async fn count(&self) -> CacheResult<u64> {
        Ok(self.topics.read().await.len() as u64)
    }

    async fn clear(&self) -> CacheResult<()> {
        self.topics.write().await.clear();
        Ok(())
    }
}
