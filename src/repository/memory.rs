//! In-memory host store.
//!
//! Keeps topics, category filters, groups and users in maps behind a lock.
//! Useful for embedding the engine in tests or in hosts that already hold
//! this data in memory. Individual topics can be made to fail on write to
//! exercise error paths.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CategoryStore, GroupStore, RepositoryError, Result, TopicStore, UserStore};
use crate::models::{CategoryFilter, CategoryId, GroupId, Topic, TopicId, User, UserId};

#[derive(Debug, Default)]
struct HostState {
    topics: HashMap<TopicId, Topic>,
    categories: HashMap<CategoryId, CategoryFilter>,
    groups: HashMap<GroupId, HashSet<UserId>>,
    users: HashMap<UserId, User>,
    /// Topics whose `set_hidden` returns an error.
    failing_topics: HashSet<TopicId>,
    /// Number of `set_hidden(_, true)` calls seen per topic.
    hide_attempts: HashMap<TopicId, usize>,
    unavailable: bool,
}

/// In-memory implementation of every host store trait.
#[derive(Clone, Default)]
pub struct InMemoryHost {
    state: Arc<RwLock<HostState>>,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_topic(&self, topic: Topic) {
        let mut state = self.state.write().await;
        state.topics.insert(topic.id, topic);
    }

    pub async fn set_category(&self, filter: CategoryFilter) {
        let mut state = self.state.write().await;
        state.categories.insert(filter.category_id, filter);
    }

    /// Register a user and record their group memberships.
    pub async fn insert_user(&self, user: User) {
        let mut state = self.state.write().await;
        for group_id in &user.group_ids {
            state.groups.entry(*group_id).or_default().insert(user.id);
        }
        state.users.insert(user.id, user);
    }

    pub async fn add_group_member(&self, group_id: GroupId, user_id: UserId) {
        let mut state = self.state.write().await;
        state.groups.entry(group_id).or_default().insert(user_id);
        if let Some(user) = state.users.get_mut(&user_id) {
            user.group_ids.insert(group_id);
        }
    }

    /// Make every write to `topic_id` fail until cleared.
    pub async fn fail_writes_for(&self, topic_id: TopicId) {
        let mut state = self.state.write().await;
        state.failing_topics.insert(topic_id);
    }

    pub async fn clear_write_failures(&self) {
        let mut state = self.state.write().await;
        state.failing_topics.clear();
    }

    /// Make every read fail, as if the host database were down.
    pub async fn set_unavailable(&self, unavailable: bool) {
        let mut state = self.state.write().await;
        state.unavailable = unavailable;
    }

    pub async fn topic(&self, topic_id: TopicId) -> Option<Topic> {
        let state = self.state.read().await;
        state.topics.get(&topic_id).cloned()
    }

    /// How many times the sweeper tried to hide `topic_id`.
    pub async fn hide_attempts(&self, topic_id: TopicId) -> usize {
        let state = self.state.read().await;
        state.hide_attempts.get(&topic_id).copied().unwrap_or(0)
    }
}

fn unavailable() -> RepositoryError {
    RepositoryError::Unavailable("in-memory host marked unavailable".to_string())
}

#[async_trait]
impl TopicStore for InMemoryHost {
    async fn topics_in_category(&self, category_id: CategoryId) -> Result<Vec<Topic>> {
        let state = self.state.read().await;
        if state.unavailable {
            return Err(unavailable());
        }
        let mut topics: Vec<Topic> = state
            .topics
            .values()
            .filter(|t| t.category_id == Some(category_id))
            .cloned()
            .collect();
        topics.sort_by_key(|t| t.id);
        Ok(topics)
    }

    async fn find_topic(&self, topic_id: TopicId) -> Result<Option<Topic>> {
        let state = self.state.read().await;
        if state.unavailable {
            return Err(unavailable());
        }
        Ok(state.topics.get(&topic_id).cloned())
    }

    async fn set_hidden(&self, topic_id: TopicId, hidden: bool) -> Result<bool> {
        let mut state = self.state.write().await;
        if hidden {
            *state.hide_attempts.entry(topic_id).or_insert(0) += 1;
        }
        if state.failing_topics.contains(&topic_id) {
            return Err(RepositoryError::Unavailable(format!(
                "write to topic {} rejected",
                topic_id
            )));
        }
        match state.topics.get_mut(&topic_id) {
            Some(topic) => {
                topic.hidden = hidden;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl CategoryStore for InMemoryHost {
    async fn filter_enabled_categories(&self) -> Result<Vec<CategoryFilter>> {
        let state = self.state.read().await;
        if state.unavailable {
            return Err(unavailable());
        }
        Ok(state
            .categories
            .values()
            .filter(|c| c.filter_enabled)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl GroupStore for InMemoryHost {
    async fn members_of(&self, group_ids: &HashSet<GroupId>) -> Result<HashSet<UserId>> {
        let state = self.state.read().await;
        if state.unavailable {
            return Err(unavailable());
        }
        Ok(group_ids
            .iter()
            .filter_map(|g| state.groups.get(g))
            .flatten()
            .copied()
            .collect())
    }
}

#[async_trait]
impl UserStore for InMemoryHost {
    async fn find_user(&self, user_id: UserId) -> Result<Option<User>> {
        let state = self.state.read().await;
        if state.unavailable {
            return Err(unavailable());
        }
        Ok(state.users.get(&user_id).cloned())
    }
}
