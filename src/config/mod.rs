//! Configuration management using the prefer crate for discovery.
//!
//! The config file mirrors the forum's site settings. ID lists may be given
//! either as the forum stores them (`"3|7"`, `"3,7"`) or as arrays; both are
//! parsed once into typed [`Settings`].

mod loader;
mod settings;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cache::CacheBackendType;
use crate::utils::parse_id_list;

pub use loader::{load_settings_with_options, LoadOptions};
pub use settings::{
    default_data_dir, CacheSettings, Settings, DEFAULT_CACHE_FILENAME, DEFAULT_REDIS_URL,
    DEFAULT_SWEEP_INTERVAL, DEFAULT_SYSTEM_USER_ID,
};

/// Errors while reading a config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {format} config: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },
}

/// An ID list as written in a config file.
///
/// Examples:
/// - `42` - a single ID
/// - `"12|15|80"` - forum list setting
/// - `"12,15"` - comma separated
/// - `[12, 15]` - native array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdListValue {
    Single(i64),
    Delimited(String),
    Items(Vec<i64>),
}

impl Default for IdListValue {
    fn default() -> Self {
        IdListValue::Delimited(String::new())
    }
}

impl IdListValue {
    /// Parse into a set, warning about and dropping entries that are not IDs.
    pub fn to_set(&self, setting: &str) -> HashSet<i64> {
        match self {
            IdListValue::Single(id) => HashSet::from([*id]),
            IdListValue::Items(items) => items.iter().copied().collect(),
            IdListValue::Delimited(raw) => {
                let parsed = parse_id_list(raw);
                if !parsed.rejected.is_empty() {
                    warn!(
                        "Ignoring non-numeric entries {:?} in {}",
                        parsed.rejected, setting
                    );
                }
                parsed.ids
            }
        }
    }
}

fn default_system_user_id() -> i64 {
    DEFAULT_SYSTEM_USER_ID
}

fn default_sweep_interval_secs() -> u64 {
    DEFAULT_SWEEP_INTERVAL.as_secs()
}

/// Visibility cache section of the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: CacheBackendType,
    /// SQLite cache file (relative to the config file).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redis_url: Option<String>,
}

/// Configuration file contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub private_topics_enabled: bool,
    /// Sweep target category; zero or negative disables the sweep.
    #[serde(default)]
    pub private_topics_category: i64,
    #[serde(default)]
    pub private_topics_excluded_topics: IdListValue,
    #[serde(default)]
    pub private_topics_permitted_groups: IdListValue,
    #[serde(default)]
    pub private_topics_admin_sees_all: bool,
    #[serde(default = "default_system_user_id")]
    pub system_user_id: i64,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    #[serde(default)]
    pub cache: CacheConfig,
    /// SQLite host database (relative to the config file).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_database: Option<String>,
    /// File this config was loaded from.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            private_topics_enabled: false,
            private_topics_category: 0,
            private_topics_excluded_topics: IdListValue::default(),
            private_topics_permitted_groups: IdListValue::default(),
            private_topics_admin_sees_all: false,
            system_user_id: DEFAULT_SYSTEM_USER_ID,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL.as_secs(),
            cache: CacheConfig::default(),
            host_database: None,
            source_path: None,
        }
    }
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Automatically discovers private-topics config files in standard locations.
    ///
    /// Defaults apply only when no file is found. A file that exists but
    /// cannot be read or parsed is an error: falling back to defaults would
    /// silently switch filtering off.
    pub async fn load() -> Result<Self, ConfigError> {
        match prefer::load("private-topics").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => Self::load_from_path(path).await,
                None => Ok(Self::default_with_env()),
            },
            Err(_) => Ok(Self::default_with_env()),
        }
    }

    /// Create a default config with environment variable overrides applied.
    pub fn default_with_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let mut config = Self::parse(&contents, ext)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config.with_env_overrides())
    }

    /// Parse config text in the format named by `ext`.
    pub fn parse(contents: &str, ext: &str) -> Result<Self, ConfigError> {
        match ext {
            "toml" => toml::from_str(contents).map_err(|e| ConfigError::Parse {
                format: "TOML",
                message: e.to_string(),
            }),
            "yaml" | "yml" => serde_yaml::from_str(contents).map_err(|e| ConfigError::Parse {
                format: "YAML",
                message: e.to_string(),
            }),
            _ => serde_json::from_str(contents).map_err(|e| ConfigError::Parse {
                format: "JSON",
                message: e.to_string(),
            }),
        }
    }

    /// Apply `PRIVATE_TOPICS_HOST_DB`, `PRIVATE_TOPICS_CACHE_PATH` and `REDIS_URL`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(db) = env_value("PRIVATE_TOPICS_HOST_DB") {
            self.host_database = Some(db);
        }
        if let Some(path) = env_value("PRIVATE_TOPICS_CACHE_PATH") {
            self.cache.path = Some(path);
        }
        if self.cache.redis_url.is_none() {
            self.cache.redis_url = env_value("REDIS_URL");
        }
        self
    }

    /// Get the base directory for resolving relative paths.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved relative to `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Parse into typed settings. `base_dir` resolves relative paths.
    pub fn to_settings(&self, base_dir: &Path) -> Settings {
        let mut cache = CacheSettings {
            backend: self.cache.backend,
            ..Default::default()
        };
        if let Some(ref path) = self.cache.path {
            cache.path = self.resolve_path(path, base_dir);
        }
        if let Some(ref url) = self.cache.redis_url {
            cache.redis_url = url.clone();
        }

        Settings {
            enabled: self.private_topics_enabled,
            sweep_category: Some(self.private_topics_category).filter(|id| *id > 0),
            excluded_topics: self
                .private_topics_excluded_topics
                .to_set("private_topics_excluded_topics"),
            permitted_groups: self
                .private_topics_permitted_groups
                .to_set("private_topics_permitted_groups"),
            admin_sees_all: self.private_topics_admin_sees_all,
            system_user_id: self.system_user_id,
            sweep_interval: Duration::from_secs(self.sweep_interval_secs.max(1)),
            cache,
            host_database: self
                .host_database
                .as_deref()
                .map(|db| self.resolve_path(db, base_dir)),
        }
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}
