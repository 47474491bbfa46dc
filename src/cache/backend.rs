//! Pluggable backend trait for the visibility cache.
//!
//! The cache records which topics the sweeper has already processed so that
//! repeated or concurrent sweeps never attempt to hide the same topic twice.
//! Backends range from process memory to stores shared across instances.

use std::sync::Arc;

use async_trait::async_trait;

use crate::models::TopicId;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors from visibility cache backends.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for CacheError {
    fn from(e: rusqlite::Error) -> Self {
        CacheError::Database(e.to_string())
    }
}

impl From<tokio::task::JoinError> for CacheError {
    fn from(e: tokio::task::JoinError) -> Self {
        CacheError::Unavailable(e.to_string())
    }
}

/// Trait for visibility cache storage backends.
///
/// Implementations must be thread-safe. `mark_processed` must be atomic with
/// respect to other callers sharing the same store: exactly one of several
/// concurrent calls for a topic observes `true`.
#[async_trait]
pub trait VisibilityCache: Send + Sync {
    /// Whether the topic has already been processed.
    async fn contains(&self, topic_id: TopicId) -> CacheResult<bool>;

    /// Record the topic as processed. Returns `true` if this call added it.
    async fn mark_processed(&self, topic_id: TopicId) -> CacheResult<bool>;

    /// Drop a marker so the topic is considered again on the next sweep.
    async fn unmark(&self, topic_id: TopicId) -> CacheResult<()>;

    /// Number of processed topics recorded.
    async fn count(&self) -> CacheResult<u64>;

    /// Forget every marker.
    async fn clear(&self) -> CacheResult<()>;
}

/// Shared handle to a cache backend.
pub type BoxedVisibilityCache = Arc<dyn VisibilityCache>;
