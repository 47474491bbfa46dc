//! Data models shared by the visibility engine and the host adapters.

mod category;
mod post;
mod topic;
mod user;

pub use category::CategoryFilter;
pub use post::{SearchCandidate, SearchPost};
pub use topic::Topic;
pub use user::User;

/// Topic identifier as used by the host forum.
pub type TopicId = i64;
/// Category identifier as used by the host forum.
pub type CategoryId = i64;
/// User identifier. The system account is conventionally negative.
pub type UserId = i64;
/// Group identifier.
pub type GroupId = i64;
/// Post identifier.
pub type PostId = i64;
