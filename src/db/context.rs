//! Per-request context passed explicitly to every engine call.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::record::Condition;

/// Bounds on relation expansion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct JoinLimits {
    /// Maximum number of tables in one join path.
    pub max_depth: Option<usize>,
    /// Maximum number of joined tables across all paths.
    pub max_tables: Option<usize>,
    /// Maximum number of related records fetched per has-many or
    /// many-to-many expansion.
    pub max_records: Option<u64>,
}

impl JoinLimits {
    /// Truncate join paths to `max_depth` and stop once `max_tables`
    /// segments have been taken.
    pub fn apply(&self, paths: Vec<Vec<String>>) -> Vec<Vec<String>> {
        let mut budget = self.max_tables.unwrap_or(usize::MAX);
        let mut out = Vec::with_capacity(paths.len());
        for mut path in paths {
            if budget == 0 {
                break;
            }
            if let Some(depth) = self.max_depth {
                path.truncate(depth);
            }
            path.truncate(budget);
            budget -= path.len();
            if !path.is_empty() {
                out.push(path);
            }
        }
        out
    }
}

/// Request-scoped state: extra row filters per table and join limits.
///
/// Table conditions restrict every read, count, update, increment and
/// delete on that table; creates are never filtered.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    conditions: IndexMap<String, Condition>,
    pub join_limits: JoinLimits,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_join_limits(mut self, limits: JoinLimits) -> Self {
        self.join_limits = limits;
        self
    }

    /// Restrict `table` further. Repeated calls are ANDed.
    pub fn with_condition(mut self, table: impl Into<String>, condition: Condition) -> Self {
        let entry = self.conditions.entry(table.into()).or_default();
        *entry = std::mem::take(entry).and(condition);
        self
    }

    /// Extra condition for `table`, `No` when unrestricted.
    pub fn condition_for(&self, table: &str) -> Condition {
        self.conditions.get(table).cloned().unwrap_or_default()
    }
}
