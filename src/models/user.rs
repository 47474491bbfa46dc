//! User model.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{GroupId, UserId};

/// A viewer as seen by the visibility engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Anonymous posting accounts never count as the viewer for exemption purposes.
    #[serde(default)]
    pub anonymous: bool,
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub group_ids: HashSet<GroupId>,
}

impl User {
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn admin(mut self) -> Self {
        self.admin = true;
        self
    }

    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }

    pub fn with_groups(mut self, groups: impl IntoIterator<Item = GroupId>) -> Self {
        self.group_ids.extend(groups);
        self
    }
}
