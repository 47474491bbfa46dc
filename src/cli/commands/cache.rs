//! Visibility cache maintenance commands.

use console::style;

use private_topics::config::Settings;
use private_topics::models::TopicId;

use crate::cli::helpers::open_visibility_cache;

/// Show cache backend and size.
pub async fn cmd_cache_stats(settings: &Settings) -> anyhow::Result<()> {
    let cache = open_visibility_cache(settings).await?;
    let count = cache.count().await?;

    println!("\n{}", style("Visibility Cache").bold());
    println!("{}", "-".repeat(40));
    println!("{:<20} {}", "Backend:", settings.cache.backend.as_str());
    if settings.cache.backend == private_topics::cache::CacheBackendType::Sqlite {
        println!("{:<20} {}", "Path:", settings.cache.path.display());
    }
    println!("{:<20} {}", "Processed topics:", count);
    Ok(())
}

/// Remove one topic from the cache.
pub async fn cmd_cache_forget(settings: &Settings, topic_id: TopicId) -> anyhow::Result<()> {
    let cache = open_visibility_cache(settings).await?;
    if !cache.contains(topic_id).await? {
        println!(
            "{} Topic {} is not in the cache",
            style("!").yellow(),
            topic_id
        );
        return Ok(());
    }

    cache.unmark(topic_id).await?;
    println!(
        "{} Topic {} will be reconsidered on the next sweep",
        style("✓").green(),
        topic_id
    );
    Ok(())
}

/// Clear the whole cache.
pub async fn cmd_cache_reset(settings: &Settings, confirm: bool) -> anyhow::Result<()> {
    if !confirm {
        println!(
            "{} This will forget every processed topic.",
            style("!").yellow()
        );
        println!("  The next sweep will reconsider the whole category.");
        println!("  Use --confirm to proceed.");
        return Ok(());
    }

    let cache = open_visibility_cache(settings).await?;
    let count = cache.count().await?;
    cache.clear().await?;

    println!(
        "{} Cleared {} entries from the visibility cache",
        style("✓").green(),
        count
    );
    Ok(())
}
