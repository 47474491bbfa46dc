//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod cache;
mod inspect;
mod sweep;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use private_topics::cache::CacheBackendType;
use private_topics::config::{load_settings_with_options, LoadOptions};
use private_topics::models::{TopicId, UserId};

#[derive(Parser)]
#[command(name = "private-topics")]
#[command(about = "Category-scoped topic visibility for forums")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Resolve relative paths from current working directory instead of config file location
    #[arg(long, global = true)]
    cwd: bool,

    /// Host forum database (overrides config file)
    #[arg(long, global = true, env = "PRIVATE_TOPICS_HOST_DB")]
    host_db: Option<PathBuf>,

    /// Visibility cache backend (overrides config file)
    #[arg(long, global = true, value_enum)]
    cache_backend: Option<CacheBackendType>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Hide every eligible topic in the configured category once
    Sweep {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run sweeps continuously until interrupted
    Daemon {
        /// Seconds between sweeps (default: sweep_interval_secs from config)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Check whether a viewer may see a topic
    Check {
        /// Topic ID to check
        #[arg(long)]
        topic: TopicId,
        /// Viewer user ID (omit for an anonymous visitor)
        #[arg(long)]
        user: Option<UserId>,
    },

    /// Show the hidden categories and exempt users for a viewer
    Scope {
        /// Viewer user ID (omit for an anonymous visitor)
        #[arg(long)]
        user: Option<UserId>,
    },

    /// Inspect or modify the visibility cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[derive(Subcommand)]
enum CacheCommands {
    /// Show cache backend and number of processed topics
    Stats,
    /// Forget a topic so the next sweep considers it again
    Forget {
        /// Topic ID
        topic_id: TopicId,
    },
    /// Forget every processed topic
    Reset {
        /// Confirm the reset
        #[arg(long)]
        confirm: bool,
    },
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        use_cwd: cli.cwd,
    };
    let (mut settings, _config) = load_settings_with_options(options).await?;

    // Apply CLI overrides
    if let Some(host_db) = cli.host_db {
        settings.host_database = Some(host_db);
    }
    if let Some(backend) = cli.cache_backend {
        settings.cache.backend = backend;
    }
    let settings = Arc::new(settings);

    match cli.command {
        Commands::Sweep { json } => sweep::cmd_sweep(settings, json).await,
        Commands::Daemon { interval } => sweep::cmd_daemon(settings, interval).await,
        Commands::Check { topic, user } => inspect::cmd_check(settings, topic, user).await,
        Commands::Scope { user } => inspect::cmd_scope(settings, user).await,
        Commands::Cache { command } => match command {
            CacheCommands::Stats => cache::cmd_cache_stats(&settings).await,
            CacheCommands::Forget { topic_id } => {
                cache::cmd_cache_forget(&settings, topic_id).await
            }
            CacheCommands::Reset { confirm } => cache::cmd_cache_reset(&settings, confirm).await,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_check_with_globals() {
        let cli = Cli::try_parse_from([
            "private-topics",
            "check",
            "--topic",
            "12",
            "--user",
            "3",
            "--cache-backend",
            "memory",
        ])
        .unwrap();
        assert_eq!(cli.cache_backend, Some(CacheBackendType::Memory));
        assert!(matches!(
            cli.command,
            Commands::Check {
                topic: 12,
                user: Some(3)
            }
        ));
    }

    #[test]
    fn test_parse_cache_forget() {
        let cli = Cli::try_parse_from(["private-topics", "cache", "forget", "7"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Cache {
                command: CacheCommands::Forget { topic_id: 7 }
            }
        ));
    }
}
