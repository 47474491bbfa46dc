//! Request-time topic visibility check.
//!
//! The host runs its own visibility check first (deletion, permissions and
//! so on) and passes the outcome in; the guard only ever narrows it.

use std::sync::Arc;

use super::resolver::ScopeResolver;
use crate::models::{Topic, User};

/// Decides whether a viewer may see a topic.
#[derive(Clone)]
pub struct AccessGuard {
    resolver: Arc<ScopeResolver>,
}

impl AccessGuard {
    pub fn new(resolver: Arc<ScopeResolver>) -> Self {
        Self { resolver }
    }

    /// Evaluate visibility of `topic` for `viewer`.
    ///
    /// `host_allows` is the result of the host's baseline check. This never
    /// fails: if host data cannot be read the topic is shown only to its
    /// owner and the system account.
    pub async fn can_see(&self, viewer: Option<&User>, topic: &Topic, host_allows: bool) -> bool {
        if !host_allows {
            return false;
        }
        let scope = self.resolver.resolve_or_lock_down(viewer).await;
        let visible = scope.can_see(topic);
        if !visible {
            tracing::debug!(
                topic_id = topic.id,
                viewer = viewer.map(|u| u.id),
                "Topic hidden from viewer"
            );
        }
        visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::models::CategoryFilter;
    use crate::repository::{HostStores, InMemoryHost};

    async fn guard(settings: Settings) -> (InMemoryHost, AccessGuard) {
        let host = InMemoryHost::new();
        host.set_category(CategoryFilter::enabled(10).allow_groups([3]))
            .await;
        let stores = HostStores::from_host(Arc::new(host.clone()));
        let resolver = Arc::new(ScopeResolver::new(Arc::new(settings), &stores));
        (host, AccessGuard::new(resolver))
    }

    #[tokio::test]
    async fn test_host_denial_wins() {
        let (_host, guard) = guard(Settings::default()).await;
        let topic = Topic::new(1, None, 2);
        assert!(!guard.can_see(Some(&User::new(2)), &topic, false).await);
    }

    #[tokio::test]
    async fn test_group_member_allowed_outsider_denied() {
        let (_host, guard) = guard(Settings::enabled()).await;
        let topic = Topic::new(1, Some(10), 50);

        let member = User::new(2).with_groups([3]);
        let outsider = User::new(4).with_groups([5]);
        assert!(guard.can_see(Some(&member), &topic, true).await);
        assert!(!guard.can_see(Some(&outsider), &topic, true).await);
        assert!(!guard.can_see(None, &topic, true).await);
    }

    #[tokio::test]
    async fn test_unfiltered_category_visible() {
        let (_host, guard) = guard(Settings::enabled()).await;
        let topic = Topic::new(1, Some(11), 50);
        assert!(guard.can_see(Some(&User::new(4)), &topic, true).await);
    }

    #[tokio::test]
    async fn test_system_account_topics_visible() {
        let (_host, guard) = guard(Settings::enabled()).await;
        let topic = Topic::new(1, Some(10), -1);
        assert!(guard.can_see(None, &topic, true).await);
    }

    #[tokio::test]
    async fn test_failure_denies_but_keeps_owner() {
        let (host, guard) = guard(Settings::enabled()).await;
        host.set_unavailable(true).await;

        let topic = Topic::new(1, Some(11), 50);
        assert!(!guard.can_see(Some(&User::new(4)), &topic, true).await);
        assert!(guard.can_see(Some(&User::new(50)), &topic, true).await);
    }

    #[tokio::test]
    async fn test_agrees_with_resolved_scope() {
        let host = InMemoryHost::new();
        host.set_category(CategoryFilter::enabled(10).allow_groups([3]))
            .await;
        host.set_category(CategoryFilter::enabled(12)).await;
        host.add_group_member(8, 60).await;
        let stores = HostStores::from_host(Arc::new(host));
        let settings = Settings::enabled().with_permitted_groups([8]);
        let resolver = Arc::new(ScopeResolver::new(Arc::new(settings), &stores));
        let guard = AccessGuard::new(resolver.clone());

        let viewers = [
            None,
            Some(User::new(2).with_groups([3])),
            Some(User::new(4)),
            Some(User::new(50)),
            Some(User::new(50).anonymous()),
        ];
        let topics = [
            Topic::new(1, Some(10), 50),
            Topic::new(2, Some(12), 60),
            Topic::new(3, Some(12), 4),
            Topic::new(4, Some(11), 4),
            Topic::new(5, None, 4),
        ];

        for viewer in &viewers {
            let scope = resolver.resolve(viewer.as_ref()).await.unwrap();
            for topic in &topics {
                assert_eq!(
                    guard.can_see(viewer.as_ref(), topic, true).await,
                    scope.can_see(topic),
                    "viewer {:?}, topic {}",
                    viewer.as_ref().map(|u| u.id),
                    topic.id
                );
            }
        }

        // Permitted group member's topic in a category hidden from everyone.
        assert!(guard.can_see(Some(&User::new(4)), &topics[1], true).await);
        // Owner without membership still sees their own topic.
        assert!(guard.can_see(Some(&User::new(50)), &topics[0], true).await);
        assert!(!guard.can_see(Some(&User::new(50).anonymous()), &topics[0], true).await);
    }
}
