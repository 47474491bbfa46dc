//! Shared helper functions for CLI commands.

use std::sync::Arc;

use anyhow::Context;
use console::style;

use private_topics::cache::{open_cache, BoxedVisibilityCache};
use private_topics::config::Settings;
use private_topics::models::{User, UserId};
use private_topics::repository::{HostStores, SqliteHost};
use private_topics::sweep::{SweepReport, SweepSkip};

/// Open the configured SQLite host database.
pub async fn open_host(settings: &Settings) -> anyhow::Result<HostStores> {
    let Some(ref db_path) = settings.host_database else {
        anyhow::bail!("No host database configured. Set host_database or pass --host-db.");
    };
    let host = SqliteHost::open(db_path)
        .await
        .with_context(|| format!("Failed to open host database {}", db_path.display()))?;
    Ok(HostStores::from_host(Arc::new(host)))
}

/// Open the configured visibility cache backend.
pub async fn open_visibility_cache(settings: &Settings) -> anyhow::Result<BoxedVisibilityCache> {
    open_cache(&settings.cache)
        .await
        .with_context(|| format!("Failed to open {} cache", settings.cache.backend.as_str()))
}

/// Look up the viewer; `None` means an anonymous visitor.
pub async fn load_viewer(
    stores: &HostStores,
    user_id: Option<UserId>,
) -> anyhow::Result<Option<User>> {
    let Some(user_id) = user_id else {
        return Ok(None);
    };
    match stores.users.find_user(user_id).await? {
        Some(user) => Ok(Some(user)),
        None => anyhow::bail!("User {} not found", user_id),
    }
}

pub fn describe_viewer(viewer: Option<&User>) -> String {
    match viewer {
        Some(user) => format!("user {}", user.id),
        None => "anonymous visitor".to_string(),
    }
}

/// Format a list of IDs in ascending order.
pub fn format_ids<'a>(ids: impl IntoIterator<Item = &'a i64>) -> String {
    let mut ids: Vec<i64> = ids.into_iter().copied().collect();
    if ids.is_empty() {
        return "(none)".to_string();
    }
    ids.sort_unstable();
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Print a sweep report in the CLI's usual style.
pub fn print_report(report: &SweepReport) {
    match report.skipped {
        Some(SweepSkip::Disabled) => {
            println!("{} Private topics disabled, nothing to do", style("!").yellow());
            return;
        }
        Some(SweepSkip::Unconfigured) => {
            println!(
                "{} Private topics category is not configured",
                style("!").yellow()
            );
            return;
        }
        Some(SweepSkip::FetchFailed) => {
            println!(
                "{} Could not list topics in category {}",
                style("✗").red(),
                report.category_id.unwrap_or_default()
            );
            return;
        }
        None => {}
    }

    let marker = if report.failed > 0 {
        style("!").yellow()
    } else {
        style("✓").green()
    };
    println!(
        "{} Swept category {}: {} examined, {} hidden",
        marker,
        report.category_id.unwrap_or_default(),
        report.examined,
        report.hidden
    );
    println!("  {:<16} {}", "already cached:", report.cached);
    println!("  {:<16} {}", "pinned:", report.pinned);
    println!("  {:<16} {}", "already hidden:", report.already_hidden);
    println!("  {:<16} {}", "excluded:", report.excluded);
    if report.missing > 0 {
        println!("  {:<16} {}", "vanished:", report.missing);
    }
    if report.failed > 0 {
        println!("  {:<16} {}", "failed:", style(report.failed).red());
    }
}
