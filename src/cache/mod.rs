//! Visibility cache: the record of topics the sweeper already processed.
//!
//! Provides pluggable backends:
//! - In-memory (ephemeral, single process)
//! - SQLite (persistent, shared by processes on one machine)
//! - Redis (distributed, multi-instance)
//!
//! The cache is created once at startup and injected into the sweeper.

mod backend;
mod memory;
mod sqlite;

#[cfg(feature = "redis-backend")]
mod redis;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use backend::{BoxedVisibilityCache, CacheError, CacheResult, VisibilityCache};
pub use memory::InMemoryVisibilityCache;
pub use sqlite::SqliteVisibilityCache;

#[cfg(feature = "redis-backend")]
pub use redis::RedisVisibilityCache;

use crate::config::CacheSettings;

/// Backend type for visibility cache storage.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendType {
    /// In-memory (single process, not persisted)
    Memory,
    /// SQLite file (persisted, multi-process)
    #[default]
    Sqlite,
    /// Redis (distributed, requires redis-backend feature)
    #[cfg(feature = "redis-backend")]
    Redis,
}

impl CacheBackendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Sqlite => "sqlite",
            #[cfg(feature = "redis-backend")]
            Self::Redis => "redis",
        }
    }
}

/// Create the configured cache backend.
pub async fn open_cache(settings: &CacheSettings) -> CacheResult<BoxedVisibilityCache> {
    match settings.backend {
        CacheBackendType::Memory => {
            tracing::debug!("Using in-memory visibility cache");
            Ok(Arc::new(InMemoryVisibilityCache::new()))
        }
        CacheBackendType::Sqlite => {
            tracing::debug!(
                "Using SQLite visibility cache at {}",
                settings.path.display()
            );
            Ok(Arc::new(SqliteVisibilityCache::open(&settings.path).await?))
        }
        #[cfg(feature = "redis-backend")]
        CacheBackendType::Redis => {
            tracing::debug!("Using Redis visibility cache");
            Ok(Arc::new(RedisVisibilityCache::new(&settings.redis_url).await?))
        }
    }
}
