//! Configuration loading.

use std::path::PathBuf;

use super::{Config, ConfigError, Settings};

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
    /// Use CWD for relative paths instead of config file directory.
    pub use_cwd: bool,
}

fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Load config from file sources.
async fn load_file_config(options: &LoadOptions) -> Result<Config, ConfigError> {
    // Priority 1: Explicit --config flag
    if let Some(ref config_path) = options.config_path {
        return Config::load_from_path(config_path).await;
    }

    // Priority 2: Auto-discover via prefer
    Config::load().await
}

fn resolve_base_dir(config: &Config, options: &LoadOptions) -> PathBuf {
    if options.use_cwd {
        return current_dir();
    }
    config.base_dir().unwrap_or_else(current_dir)
}

/// Load settings and the config they came from.
///
/// Fails when a config file was given or discovered but is unreadable or
/// invalid.
pub async fn load_settings_with_options(
    options: LoadOptions,
) -> Result<(Settings, Config), ConfigError> {
    let config = load_file_config(&options).await?;
    let base_dir = resolve_base_dir(&config, &options);

    if let Some(ref path) = config.source_path {
        tracing::debug!("Loaded config from {}", path.display());
    }

    let settings = config.to_settings(&base_dir);
    Ok((settings, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn load_file(name: &str, contents: &str) -> Result<(Settings, Config), ConfigError> {
        let dir = tempdir().unwrap();
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        load_settings_with_options(LoadOptions {
            config_path: Some(path),
            use_cwd: true,
        })
        .await
    }

    #[tokio::test]
    async fn test_explicit_config_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(
            &path,
            "private_topics_enabled = true\nprivate_topics_category = 3\nhost_database = \"forum.db\"\n",
        )
        .unwrap();

        let (settings, config) = load_settings_with_options(LoadOptions {
            config_path: Some(path.clone()),
            use_cwd: false,
        })
        .await
        .unwrap();

        assert!(settings.enabled);
        assert_eq!(settings.sweep_category, Some(3));
        assert_eq!(config.source_path, Some(path));
        assert_eq!(settings.host_database, Some(dir.path().join("forum.db")));
    }

    #[tokio::test]
    async fn test_broken_config_is_an_error() {
        let err = load_file("settings.json", "{ not json").await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse { format: "JSON", .. }));
    }

    #[tokio::test]
    async fn test_missing_explicit_config_is_an_error() {
        let err = load_settings_with_options(LoadOptions {
            config_path: Some(PathBuf::from("/nonexistent/private-topics.toml")),
            use_cwd: true,
        })
        .await
        .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[tokio::test]
    async fn test_one_bad_value_never_disables_filtering() {
        let cases = [
            (
                "single.toml",
                "private_topics_enabled = true\nprivate_topics_category = 3\nprivate_topics_excluded_topics = 42\n",
            ),
            (
                "backend.toml",
                "private_topics_enabled = true\nprivate_topics_category = 3\n[cache]\nbackend = \"redis\"\n",
            ),
            (
                "quoted.json",
                r#"{"private_topics_enabled": true, "private_topics_category": "3"}"#,
            ),
        ];

        for (name, contents) in cases {
            match load_file(name, contents).await {
                Ok((settings, _)) => {
                    assert!(settings.enabled, "{} loaded with filtering off", name);
                    assert_eq!(settings.sweep_category, Some(3), "{}", name);
                }
                Err(ConfigError::Parse { .. }) => {}
                Err(e) => panic!("{}: unexpected error {}", name, e),
            }
        }

        let (settings, _) = load_file("single.toml", cases[0].1).await.unwrap();
        assert_eq!(settings.excluded_topics, std::collections::HashSet::from([42]));
        assert!(load_file("quoted.json", cases[2].1).await.is_err());
    }
}
