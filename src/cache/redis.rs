//! Redis-backed visibility cache for multi-instance deployments.
//!
//! All processed topic IDs live in one Redis set. `SADD` reports whether the
//! member was new, which makes the claim atomic across every sweeper sharing
//! the server.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::backend::{CacheError, CacheResult, VisibilityCache};
use crate::models::TopicId;

/// Key prefix for private-topics data in Redis.
const KEY_PREFIX: &str = "private-topics:";

/// Redis-backed visibility cache.
#[derive(Clone)]
pub struct RedisVisibilityCache {
    conn: ConnectionManager,
    key: String,
}

impl RedisVisibilityCache {
    /// Connect to Redis.
    ///
    /// # Arguments
    /// * `redis_url` - Redis connection URL (e.g., "redis://localhost:6379")
    pub async fn new(redis_url: &str) -> CacheResult<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| CacheError::Database(format!("Redis connection error: {}", e)))?;

        let conn = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::Database(format!("Redis connection manager error: {}", e))
        })?;

        Ok(Self {
            conn,
            key: format!("{}hidden_topics", KEY_PREFIX),
        })
    }
}

fn redis_error(e: redis::RedisError) -> CacheError {
    CacheError::Database(e.to_string())
}

#[async_trait]
impl VisibilityCache for RedisVisibilityCache {
    async fn contains(&self, topic_id: TopicId) -> CacheResult<bool> {
        let mut conn = self.conn.clone();
        conn.sismember(&self.key, topic_id)
            .await
            .map_err(redis_error)
    }

    async fn mark_processed(&self, topic_id: TopicId) -> CacheResult<bool> {
        let mut conn = self.conn.clone();
        let added: i64 = conn
            .sadd(&self.key, topic_id)
            .await
            .map_err(redis_error)?;
        Ok(added == 1)
    }

    async fn unmark(&self, topic_id: TopicId) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        conn.srem::<_, _, ()>(&self.key, topic_id)
            .await
            .map_err(redis_error)
    }

    async fn count(&self) -> CacheResult<u64> {
        let mut conn = self.conn.clone();
        conn.scard(&self.key).await.map_err(redis_error)
    }

    async fn clear(&self) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(&self.key).await.map_err(redis_error)
    }
}
