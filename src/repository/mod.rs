//! Host store interfaces.
//!
//! The visibility engine never owns topic, category or group data. It reads
//! them through these traits, which the embedding forum implements on top of
//! its own persistence. Two implementations ship with the crate:
//! - [`InMemoryHost`]: everything in process memory (tests, embedding)
//! - [`SqliteHost`]: a SQLite database with a forum-like schema

mod memory;
mod sqlite;

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::models::{CategoryFilter, CategoryId, GroupId, Topic, TopicId, User, UserId};

pub use memory::InMemoryHost;
pub use sqlite::{SqliteHost, ALLOWED_GROUPS_FIELD, FILTER_ENABLED_FIELD};

/// Errors from host store reads and writes.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("Host store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for host store operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Topic reads and the single write the sweeper performs.
#[async_trait]
pub trait TopicStore: Send + Sync {
    /// All topics in a category, hidden and pinned ones included.
    async fn topics_in_category(&self, category_id: CategoryId) -> Result<Vec<Topic>>;

    async fn find_topic(&self, topic_id: TopicId) -> Result<Option<Topic>>;

    /// Persist the hidden flag. Returns `false` when the topic no longer exists.
    async fn set_hidden(&self, topic_id: TopicId, hidden: bool) -> Result<bool>;
}

/// Category custom field reads.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Every category whose filter flag is on, with its allowed groups.
    async fn filter_enabled_categories(&self) -> Result<Vec<CategoryFilter>>;
}

/// Group membership reads.
#[async_trait]
pub trait GroupStore: Send + Sync {
    /// Union of the members of all `group_ids`.
    async fn members_of(&self, group_ids: &HashSet<GroupId>) -> Result<HashSet<UserId>>;
}

/// User lookups, used by the CLI to turn an ID into a viewer.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, user_id: UserId) -> Result<Option<User>>;
}

/// The full set of host collaborators, as shared trait objects.
#[derive(Clone)]
pub struct HostStores {
    pub topics: Arc<dyn TopicStore>,
    pub categories: Arc<dyn CategoryStore>,
    pub groups: Arc<dyn GroupStore>,
    pub users: Arc<dyn UserStore>,
}

impl std::fmt::Debug for HostStores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostStores").finish_non_exhaustive()
    }
}

impl HostStores {
    /// Use one host object for every store.
    pub fn from_host<H>(host: Arc<H>) -> Self
    where
        H: TopicStore + CategoryStore + GroupStore + UserStore + 'static,
    {
        Self {
            topics: host.clone(),
            categories: host.clone(),
            groups: host.clone(),
            users: host,
        }
    }
}
