//! Read-only visibility checks.

use std::sync::Arc;

use console::style;

use private_topics::config::Settings;
use private_topics::models::{TopicId, UserId};
use private_topics::visibility::{AccessGuard, HiddenCategories, ScopeResolver};

use crate::cli::helpers::{describe_viewer, format_ids, load_viewer, open_host};

/// Evaluate the access guard for one topic and viewer.
///
/// The host's own permission check is assumed to pass.
pub async fn cmd_check(
    settings: Arc<Settings>,
    topic_id: TopicId,
    user_id: Option<UserId>,
) -> anyhow::Result<()> {
    let stores = open_host(&settings).await?;
    let viewer = load_viewer(&stores, user_id).await?;

    let Some(topic) = stores.topics.find_topic(topic_id).await? else {
        println!("{} Topic {} not found", style("✗").red(), topic_id);
        return Ok(());
    };

    let resolver = Arc::new(ScopeResolver::new(settings, &stores));
    let guard = AccessGuard::new(resolver);
    let who = describe_viewer(viewer.as_ref());

    if guard.can_see(viewer.as_ref(), &topic, true).await {
        println!("{} Topic {} is visible to {}", style("✓").green(), topic.id, who);
    } else {
        println!(
            "{} Topic {} is hidden from {} (category {})",
            style("✗").red(),
            topic.id,
            who,
            topic
                .category_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "none".to_string())
        );
    }
    Ok(())
}

/// Print the resolved scope for a viewer.
pub async fn cmd_scope(settings: Arc<Settings>, user_id: Option<UserId>) -> anyhow::Result<()> {
    let stores = open_host(&settings).await?;
    let viewer = load_viewer(&stores, user_id).await?;
    let resolver = ScopeResolver::new(settings, &stores);
    let scope = resolver.resolve(viewer.as_ref()).await?;

    println!(
        "\n{}",
        style(format!("Scope for {}", describe_viewer(viewer.as_ref()))).bold()
    );
    println!("{}", "-".repeat(40));

    if scope.is_unrestricted() {
        println!("{} Unrestricted: no topics are filtered", style("✓").green());
        return Ok(());
    }

    let hidden = match scope.hidden() {
        HiddenCategories::Listed(ids) => format_ids(ids),
        HiddenCategories::All => "all categories".to_string(),
    };
    println!("{:<20} {}", "Hidden categories:", hidden);
    println!("{:<20} {}", "Exempt users:", format_ids(scope.exempt_users()));
    Ok(())
}
