//! Resolved visibility state for one viewer.
//!
//! A [`ViewerScope`] is plain data: once resolved, every check against it is
//! synchronous and cannot fail. Hosts that evaluate many topics or posts for
//! the same viewer should resolve once and reuse the scope.

use std::collections::HashSet;

use crate::models::{CategoryId, SearchCandidate, Topic, UserId};

/// Which categories are hidden from the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HiddenCategories {
    Listed(HashSet<CategoryId>),
    /// Every category. Used when the real set could not be resolved.
    All,
}

impl HiddenCategories {
    pub fn contains(&self, category_id: CategoryId) -> bool {
        match self {
            Self::Listed(ids) => ids.contains(&category_id),
            Self::All => true,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Listed(ids) => ids.is_empty(),
            Self::All => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerScope {
    unrestricted: bool,
    exempt_users: HashSet<UserId>,
    hidden: HiddenCategories,
}

impl ViewerScope {
    pub fn new(exempt_users: HashSet<UserId>, hidden_categories: HashSet<CategoryId>) -> Self {
        Self {
            unrestricted: false,
            exempt_users,
            hidden: HiddenCategories::Listed(hidden_categories),
        }
    }

    /// A scope that sees everything (filtering off or admin bypass).
    pub fn unrestricted() -> Self {
        Self {
            unrestricted: true,
            exempt_users: HashSet::new(),
            hidden: HiddenCategories::Listed(HashSet::new()),
        }
    }

    /// A scope that hides every categorized topic not owned by `exempt_users`.
    pub fn locked_down(exempt_users: HashSet<UserId>) -> Self {
        Self {
            unrestricted: false,
            exempt_users,
            hidden: HiddenCategories::All,
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.unrestricted
    }

    pub fn exempt_users(&self) -> &HashSet<UserId> {
        &self.exempt_users
    }

    pub fn hidden(&self) -> &HiddenCategories {
        &self.hidden
    }

    pub fn is_exempt(&self, user_id: UserId) -> bool {
        self.exempt_users.contains(&user_id)
    }

    pub fn hides_category(&self, category_id: CategoryId) -> bool {
        !self.unrestricted && self.hidden.contains(category_id)
    }

    /// Whether the viewer may see `topic`.
    ///
    /// Uncategorized topics are always visible, then the owner's exemption
    /// is checked before the category.
    pub fn can_see(&self, topic: &Topic) -> bool {
        if self.unrestricted {
            return true;
        }
        let Some(category_id) = topic.category_id else {
            return true;
        };
        if self.is_exempt(topic.user_id) {
            return true;
        }
        if self.hidden.is_empty() {
            return true;
        }
        !self.hidden.contains(category_id)
    }

    /// Whether a search hit survives filtering.
    pub fn keeps<P: SearchCandidate>(&self, post: &P) -> bool {
        if self.unrestricted || self.is_exempt(post.author_id()) {
            return true;
        }
        match post.category_id() {
            Some(category_id) => !self.hidden.contains(category_id),
            None => true,
        }
    }

    /// Drop the posts the viewer may not see, keeping the rest in order.
    pub fn retain_visible<P: SearchCandidate>(&self, mut posts: Vec<P>) -> Vec<P> {
        posts.retain(|p| self.keeps(p));
        posts
    }
}
