//! Delimited ID list parsing.
//!
//! Forum settings store ID lists as strings such as `"3|7|12"` or `"3,7,12"`.
//! They are parsed once into typed sets; entries that are not integers are
//! reported back to the caller instead of failing the whole list.

use std::collections::HashSet;

/// Result of parsing a delimited ID list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdList {
    pub ids: HashSet<i64>,
    /// Entries that could not be parsed, trimmed.
    pub rejected: Vec<String>,
}

/// Parse a `|` or `,` separated list of integer IDs.
///
/// Blank entries are ignored. Anything else that does not parse as an `i64`
/// ends up in [`IdList::rejected`].
pub fn parse_id_list(raw: &str) -> IdList {
    let mut list = IdList::default();
    for entry in raw.split(['|', ',']) {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        match entry.parse::<i64>() {
            Ok(id) => {
                list.ids.insert(id);
            }
            Err(_) => list.rejected.push(entry.to_string()),
        }
    }
    list
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pipe_and_comma() {
        let list = parse_id_list("1|2,3 | 4");
        assert_eq!(list.ids, HashSet::from([1, 2, 3, 4]));
        assert!(list.rejected.is_empty());
    }

    #[test]
    fn test_parse_empty() {
        let list = parse_id_list("");
        assert!(list.ids.is_empty());
        assert!(list.rejected.is_empty());

        let list = parse_id_list(" , | ");
        assert!(list.ids.is_empty());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let list = parse_id_list("42,abc,7x,-3");
        assert_eq!(list.ids, HashSet::from([42, -3]));
        assert_eq!(list.rejected, vec!["abc".to_string(), "7x".to_string()]);
    }
}
