//! Typed runtime settings.
//!
//! Everything here is parsed once from a [`super::Config`]; the engine never
//! looks at raw delimited strings.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::CacheBackendType;
use crate::models::{CategoryId, GroupId, TopicId, UserId};

/// Default cache filename.
pub const DEFAULT_CACHE_FILENAME: &str = "visibility.db";

/// Conventional ID of the forum's system account.
pub const DEFAULT_SYSTEM_USER_ID: UserId = -1;

/// Default sweep period (10 minutes).
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(600);

/// Default Redis URL when neither config nor `REDIS_URL` provide one.
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Base data directory for files the crate owns.
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("private-topics")
}

/// Where the visibility cache lives.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub backend: CacheBackendType,
    /// SQLite cache file.
    pub path: PathBuf,
    /// Redis connection URL.
    pub redis_url: String,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            backend: CacheBackendType::default(),
            path: default_data_dir().join(DEFAULT_CACHE_FILENAME),
            redis_url: std::env::var("REDIS_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_REDIS_URL.to_string()),
        }
    }
}

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Master switch. When off, nothing is filtered and sweeps do nothing.
    pub enabled: bool,
    /// Category the sweeper hides topics in. `None` disables the sweep.
    pub sweep_category: Option<CategoryId>,
    /// Topics the sweeper must never touch.
    pub excluded_topics: HashSet<TopicId>,
    /// Groups whose members are exempt from filtering everywhere.
    pub permitted_groups: HashSet<GroupId>,
    /// Admins bypass all filtering.
    pub admin_sees_all: bool,
    pub system_user_id: UserId,
    pub sweep_interval: Duration,
    pub cache: CacheSettings,
    /// SQLite host database used by the CLI.
    pub host_database: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: false,
            sweep_category: None,
            excluded_topics: HashSet::new(),
            permitted_groups: HashSet::new(),
            admin_sees_all: false,
            system_user_id: DEFAULT_SYSTEM_USER_ID,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            cache: CacheSettings::default(),
            host_database: None,
        }
    }
}

impl Settings {
    /// Settings with filtering switched on and everything else default.
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Default::default()
        }
    }

    pub fn with_sweep_category(mut self, category_id: CategoryId) -> Self {
        self.sweep_category = Some(category_id).filter(|id| *id > 0);
        self
    }

    pub fn with_excluded_topics(mut self, topics: impl IntoIterator<Item = TopicId>) -> Self {
        self.excluded_topics.extend(topics);
        self
    }

    pub fn with_permitted_groups(mut self, groups: impl IntoIterator<Item = GroupId>) -> Self {
        self.permitted_groups.extend(groups);
        self
    }

    pub fn with_admin_sees_all(mut self, admin_sees_all: bool) -> Self {
        self.admin_sees_all = admin_sees_all;
        self
    }

    /// Whether `topic_id` is on the sweep exclusion list.
    pub fn is_excluded(&self, topic_id: TopicId) -> bool {
        self.excluded_topics.contains(&topic_id)
    }
}
