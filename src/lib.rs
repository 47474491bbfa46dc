//! Private topics: category-scoped topic visibility for forums.
//!
//! Categories can be flagged so that their topics are only visible to the
//! topic owner, members of the category's allowed groups, globally permitted
//! groups and (optionally) admins. Filtering happens at read time through
//! [`visibility::AccessGuard`] and [`visibility::SearchResultFilter`]; the
//! optional [`sweep::HidingSweeper`] additionally sets the hidden flag on
//! topics in one configured category.
//!
//! The host forum is reached through the store traits in [`repository`].

pub mod cache;
pub mod config;
pub mod models;
pub mod repository;
pub mod sweep;
pub mod utils;
pub mod visibility;
