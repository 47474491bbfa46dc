//! Topic model.

use serde::{Deserialize, Serialize};

use super::{CategoryId, TopicId, UserId};

/// The subset of a host topic record that visibility decisions depend on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: TopicId,
    /// Uncategorized topics (private messages, for instance) have none.
    pub category_id: Option<CategoryId>,
    /// Owning user.
    pub user_id: UserId,
    pub pinned: bool,
    pub hidden: bool,
}

impl Topic {
    /// Create a visible, unpinned topic.
    pub fn new(id: TopicId, category_id: Option<CategoryId>, user_id: UserId) -> Self {
        Self {
            id,
            category_id,
            user_id,
            pinned: false,
            hidden: false,
        }
    }

    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Whether the sweeper may hide this topic.
    pub fn is_hide_candidate(&self) -> bool {
        !self.pinned && !self.hidden
    }
}
