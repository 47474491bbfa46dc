//! Per-category filter configuration.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{CategoryId, GroupId};

/// Filter settings stored in a category's custom fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryFilter {
    pub category_id: CategoryId,
    pub filter_enabled: bool,
    /// Groups whose members may still see the category. Empty means nobody.
    #[serde(default)]
    pub allowed_groups: HashSet<GroupId>,
}

impl CategoryFilter {
    /// A filter-enabled category visible to no group.
    pub fn enabled(category_id: CategoryId) -> Self {
        Self {
            category_id,
            filter_enabled: true,
            allowed_groups: HashSet::new(),
        }
    }

    pub fn allow_groups(mut self, groups: impl IntoIterator<Item = GroupId>) -> Self {
        self.allowed_groups.extend(groups);
        self
    }

    /// Whether the category stays hidden from a member of `group_ids`.
    pub fn hides_from(&self, group_ids: &HashSet<GroupId>) -> bool {
        self.allowed_groups.is_disjoint(group_ids)
    }
}
