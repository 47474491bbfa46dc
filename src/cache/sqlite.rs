//! SQLite-backed visibility cache.
//!
//! Stores processed topic IDs in a `hidden_topics` table so the markers
//! survive restarts and are shared by every process using the same file.
//! `INSERT OR IGNORE` gives the atomic claim semantics the sweeper relies on.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::backend::{CacheError, CacheResult, VisibilityCache};
use crate::models::TopicId;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed visibility cache.
#[derive(Debug, Clone)]
pub struct SqliteVisibilityCache {
    db_path: PathBuf,
}

impl SqliteVisibilityCache {
    /// Open (or create) a cache file.
    pub async fn open(db_path: &Path) -> CacheResult<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| CacheError::Unavailable(e.to_string()))?;
            }
        }

        let cache = Self {
            db_path: db_path.to_path_buf(),
        };
        cache
            .with_conn(|conn| {
                conn.execute_batch(
                    r#"
                    CREATE TABLE IF NOT EXISTS hidden_topics (
                        topic_id INTEGER PRIMARY KEY,
                        processed_at TEXT NOT NULL
                    );
                "#,
                )
            })
            .await?;
        Ok(cache)
    }

    /// When the topic was marked, as an RFC 3339 timestamp.
    pub async fn processed_at(&self, topic_id: TopicId) -> CacheResult<Option<String>> {
        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT processed_at FROM hidden_topics WHERE topic_id = ?1",
                params![topic_id],
                |row| row.get(0),
            )
            .optional()
        })
        .await
    }

    async fn with_conn<T, F>(&self, f: F) -> CacheResult<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let path = self.db_path.clone();
        tokio::task::spawn_blocking(move || -> CacheResult<T> {
            let conn = Connection::open(&path)?;
            conn.busy_timeout(BUSY_TIMEOUT)?;
            Ok(f(&conn)?)
        })
        .await?
    }
}

#[async_trait]
impl VisibilityCache for SqliteVisibilityCache {
    async fn contains(&self, topic_id: TopicId) -> CacheResult<bool> {
        self.with_conn(move |conn| {
            let found: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM hidden_topics WHERE topic_id = ?1",
                    params![topic_id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
        .await
    }

    async fn mark_processed(&self, topic_id: TopicId) -> CacheResult<bool> {
        let now = Utc::now().to_rfc3339();
        self.with_conn(move |conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO hidden_topics (topic_id, processed_at) VALUES (?1, ?2)",
                params![topic_id, now],
            )?;
            Ok(inserted == 1)
        })
        .await
    }

    async fn unmark(&self, topic_id: TopicId) -> CacheResult<()> {
        self.with_conn(move |conn| {
            conn.execute(
                "DELETE FROM hidden_topics WHERE topic_id = ?1",
                params![topic_id],
            )?;
            Ok(())
        })
        .await
    }

    async fn count(&self) -> CacheResult<u64> {
        self.with_conn(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM hidden_topics", [], |row| row.get(0))?;
            Ok(count.max(0) as u64)
        })
        .await
    }

    async fn clear(&self) -> CacheResult<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM hidden_topics", [])?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_mark_and_contains() {
        let dir = tempdir().unwrap();
        let cache = SqliteVisibilityCache::open(&dir.path().join("cache.db"))
            .await
            .unwrap();

        assert!(!cache.contains(3).await.unwrap());
        assert!(cache.mark_processed(3).await.unwrap());
        assert!(!cache.mark_processed(3).await.unwrap());
        assert!(cache.contains(3).await.unwrap());
        assert!(cache.processed_at(3).await.unwrap().is_some());
        assert!(cache.processed_at(4).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_persistence_across_opens() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("cache.db");

        {
            let cache = SqliteVisibilityCache::open(&path).await.unwrap();
            cache.mark_processed(10).await.unwrap();
            cache.mark_processed(11).await.unwrap();
        }

        {
            let cache = SqliteVisibilityCache::open(&path).await.unwrap();
            assert!(cache.contains(10).await.unwrap());
            assert!(cache.contains(11).await.unwrap());
            assert_eq!(cache.count().await.unwrap(), 2);
        }
    }

    #[tokio::test]
    async fn test_unmark_and_clear() {
        let dir = tempdir().unwrap();
        let cache = SqliteVisibilityCache::open(&dir.path().join("cache.db"))
            .await
            .unwrap();

        cache.mark_processed(1).await.unwrap();
        cache.mark_processed(2).await.unwrap();
        cache.unmark(1).await.unwrap();
        assert!(!cache.contains(1).await.unwrap());
        assert_eq!(cache.count().await.unwrap(), 1);

        cache.clear().await.unwrap();
        assert_eq!(cache.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_two_handles_single_winner() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.db");
        let first = SqliteVisibilityCache::open(&path).await.unwrap();
        let second = SqliteVisibilityCache::open(&path).await.unwrap();

        let (a, b) = tokio::join!(first.mark_processed(8), second.mark_processed(8));
        let winners = [a.unwrap(), b.unwrap()].iter().filter(|w| **w).count();
        assert_eq!(winners, 1);
    }
}
