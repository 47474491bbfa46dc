//! Post-processing of search results.

use std::sync::Arc;

use super::resolver::ScopeResolver;
use crate::models::{SearchCandidate, User};

/// Removes hits from hidden categories, after the host's search has ranked them.
#[derive(Clone)]
pub struct SearchResultFilter {
    resolver: Arc<ScopeResolver>,
}

impl SearchResultFilter {
    pub fn new(resolver: Arc<ScopeResolver>) -> Self {
        Self { resolver }
    }

    /// Keep the posts `viewer` may see, in their original order.
    ///
    /// The viewer's scope is resolved once per call.
    pub async fn filter<P: SearchCandidate>(&self, viewer: Option<&User>, posts: Vec<P>) -> Vec<P> {
        if posts.is_empty() {
            return posts;
        }
        let scope = self.resolver.resolve_or_lock_down(viewer).await;
        let before = posts.len();
        let kept = scope.retain_visible(posts);
        tracing::debug!(
            viewer = viewer.map(|u| u.id),
            removed = before - kept.len(),
            "Filtered search results"
        );
        kept
    }
}
