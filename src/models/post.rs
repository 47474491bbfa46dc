//! Search result rows.

use serde::{Deserialize, Serialize};

use super::{CategoryId, PostId, TopicId, UserId};

/// Anything the search filter can judge: it needs the author and the
/// category of the topic the row belongs to.
pub trait SearchCandidate {
    fn author_id(&self) -> UserId;
    fn category_id(&self) -> Option<CategoryId>;
}

/// A ranked search hit produced by the host's search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPost {
    pub id: PostId,
    pub topic_id: TopicId,
    pub user_id: UserId,
    pub category_id: Option<CategoryId>,
}

impl SearchCandidate for SearchPost {
    fn author_id(&self) -> UserId {
        self.user_id
    }

    fn category_id(&self) -> Option<CategoryId> {
        self.category_id
    }
}
