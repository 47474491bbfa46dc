//! Visibility engine.
//!
//! Read-time filtering is split into resolution and evaluation:
//! - [`ScopeResolver`] reads category filters and group membership from the
//!   host and produces a [`ViewerScope`] for one viewer
//! - [`AccessGuard`] and [`SearchResultFilter`] evaluate topics and search
//!   hits against that scope
//!
//! Neither evaluator returns errors to the host.

mod guard;
mod resolver;
mod scope;
mod search;

pub use guard::AccessGuard;
pub use resolver::{CategoryFilterResolver, ScopeResolver, UnfilteredUserResolver};
pub use scope::{HiddenCategories, ViewerScope};
pub use search::SearchResultFilter;
