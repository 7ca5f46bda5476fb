//! Filter parameters to one WHERE condition.
//!
//! A filter key is `filter` followed by an address: `filter`, `filter1`,
//! `filter1a`. The address is split into runs of digits and non-digits
//! (`1a` is `["1", "a"]`) and each condition is stored at that path.
//! Conditions at one node are ANDed; the node's children are combined
//! recursively and ORed together, and that disjunction is ANDed onto the
//! node's own conditions.

use std::sync::LazyLock;

use regex::Regex;

use super::condition::Condition;
use super::params::Params;
use super::path_tree::PathTree;
use crate::schema::ReflectedTable;

const FILTER_PREFIX: &str = "filter";

static ADDRESS_SEGMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+|\D+").unwrap());

/// Path of a filter key, `None` for keys that are not filters.
pub fn filter_address(key: &str) -> Option<Vec<String>> {
    let suffix = key.strip_prefix(FILTER_PREFIX)?;
    Some(
        ADDRESS_SEGMENT
            .find_iter(suffix)
            .map(|m| m.as_str().to_string())
            .collect(),
    )
}

/// Parsed filter conditions grouped by address.
pub fn conditions_tree(table: &ReflectedTable, params: &Params) -> PathTree<Condition> {
    let mut tree = PathTree::new();
    for (key, filters) in params.iter() {
        let Some(path) = filter_address(key) else {
            continue;
        };
        for filter in filters {
            let condition = Condition::from_filter(table, filter);
            if !condition.is_no() {
                tree.put(&path, condition);
            }
        }
    }
    tree
}

/// Fold a condition tree into one condition.
pub fn combine(tree: &PathTree<Condition>) -> Condition {
    let and = tree
        .values()
        .iter()
        .cloned()
        .fold(Condition::No, Condition::and);
    let or = tree
        .children()
        .map(|(_, child)| combine(child))
        .fold(Condition::No, Condition::or);
    and.and(or)
}

/// WHERE condition of a list or count request.
pub fn combined_conditions(table: &ReflectedTable, params: &Params) -> Condition {
    combine(&conditions_tree(table, params))
}
