//! List result document.

use serde::Serialize;

use crate::db::Row;

/// Records of a list request. `results` (the total match count) is only
/// present for paged requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListDocument {
    pub records: Vec<Row>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<u64>,
}

impl ListDocument {
    pub fn new(records: Vec<Row>, results: Option<u64>) -> Self {
        Self { records, results }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
