//! Shared utility functions.
//!
//! - `ids`: parsing of delimited ID lists from settings and custom fields

mod ids;

pub use ids::{parse_id_list, IdList};
