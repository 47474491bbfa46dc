//! Per-viewer resolution of hidden categories and exempt users.
//!
//! Both resolvers read host data fresh on every call. [`ScopeResolver`]
//! combines them with the global switches into a [`ViewerScope`].

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, error};

use super::scope::ViewerScope;
use crate::config::Settings;
use crate::models::{CategoryId, User, UserId};
use crate::repository::{CategoryStore, GroupStore, HostStores, Result};

/// Computes the categories a viewer must not see topics from.
#[derive(Clone)]
pub struct CategoryFilterResolver {
    settings: Arc<Settings>,
    categories: Arc<dyn CategoryStore>,
}

impl CategoryFilterResolver {
    pub fn new(settings: Arc<Settings>, categories: Arc<dyn CategoryStore>) -> Self {
        Self {
            settings,
            categories,
        }
    }

    /// Filter-enabled categories whose allowed groups the viewer is not in.
    ///
    /// Without a viewer every filter-enabled category is hidden. A category
    /// with no allowed groups is hidden from everyone.
    pub async fn hidden_categories(&self, viewer: Option<&User>) -> Result<HashSet<CategoryId>> {
        if !self.settings.enabled {
            return Ok(HashSet::new());
        }

        let filters = self.categories.filter_enabled_categories().await?;
        let hidden: HashSet<CategoryId> = filters
            .into_iter()
            .filter(|f| f.filter_enabled)
            .filter(|f| match viewer {
                Some(user) => f.hides_from(&user.group_ids),
                None => true,
            })
            .map(|f| f.category_id)
            .collect();

        debug!(
            viewer = viewer.map(|u| u.id),
            hidden = hidden.len(),
            "Resolved hidden categories"
        );
        Ok(hidden)
    }
}

/// Computes the users whose content is never filtered for a viewer.
#[derive(Clone)]
pub struct UnfilteredUserResolver {
    settings: Arc<Settings>,
    groups: Arc<dyn GroupStore>,
}

impl UnfilteredUserResolver {
    pub fn new(settings: Arc<Settings>, groups: Arc<dyn GroupStore>) -> Self {
        Self { settings, groups }
    }

    /// The system account, the viewer (unless anonymous) and every member of
    /// a globally permitted group.
    pub async fn exempt_users(&self, viewer: Option<&User>) -> Result<HashSet<UserId>> {
        let mut exempt = if self.settings.permitted_groups.is_empty() {
            HashSet::new()
        } else {
            self.groups
                .members_of(&self.settings.permitted_groups)
                .await?
        };

        exempt.insert(self.settings.system_user_id);
        if let Some(user) = viewer.filter(|u| !u.anonymous) {
            exempt.insert(user.id);
        }
        Ok(exempt)
    }
}

/// Resolves complete viewer scopes.
#[derive(Clone)]
pub struct ScopeResolver {
    settings: Arc<Settings>,
    categories: CategoryFilterResolver,
    users: UnfilteredUserResolver,
}

impl ScopeResolver {
    pub fn new(settings: Arc<Settings>, stores: &HostStores) -> Self {
        Self {
            categories: CategoryFilterResolver::new(settings.clone(), stores.categories.clone()),
            users: UnfilteredUserResolver::new(settings.clone(), stores.groups.clone()),
            settings,
        }
    }

    pub fn categories(&self) -> &CategoryFilterResolver {
        &self.categories
    }

    pub fn users(&self) -> &UnfilteredUserResolver {
        &self.users
    }

    /// Whether filtering does not apply to this viewer at all.
    pub fn bypasses(&self, viewer: Option<&User>) -> bool {
        !self.settings.enabled
            || (self.settings.admin_sees_all && viewer.is_some_and(|u| u.admin))
    }

    /// Resolve both sets for `viewer`.
    pub async fn resolve(&self, viewer: Option<&User>) -> Result<ViewerScope> {
        if self.bypasses(viewer) {
            return Ok(ViewerScope::unrestricted());
        }
        let exempt = self.users.exempt_users(viewer).await?;
        let hidden = self.categories.hidden_categories(viewer).await?;
        Ok(ViewerScope::new(exempt, hidden))
    }

    /// Resolve, falling back to a locked-down scope if the host store fails.
    pub async fn resolve_or_lock_down(&self, viewer: Option<&User>) -> ViewerScope {
        match self.resolve(viewer).await {
            Ok(scope) => scope,
            Err(e) => {
                error!(
                    viewer = viewer.map(|u| u.id),
                    "Failed to resolve visibility scope, hiding all filtered content: {}", e
                );
                self.locked_down(viewer)
            }
        }
    }

    pub(crate) fn locked_down(&self, viewer: Option<&User>) -> ViewerScope {
        let mut exempt = HashSet::from([self.settings.system_user_id]);
        if let Some(user) = viewer.filter(|u| !u.anonymous) {
            exempt.insert(user.id);
        }
        ViewerScope::locked_down(exempt)
    }
}
