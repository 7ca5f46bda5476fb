//! Reflected database: every exposed table, keyed by name.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::table::ReflectedTable;

/// Tables sorted by name, so scans (junction detection) are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "DatabaseRecord", into = "DatabaseRecord")]
pub struct ReflectedDatabase {
    tables: IndexMap<String, ReflectedTable>,
}

impl ReflectedDatabase {
    pub fn new(tables: impl IntoIterator<Item = ReflectedTable>) -> Self {
        let mut db = Self::default();
        for table in tables {
            db.tables.insert(table.name().to_string(), table);
        }
        db.tables.sort_keys();
        db
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn table(&self, name: &str) -> Option<&ReflectedTable> {
        self.tables.get(name)
    }

    pub fn tables(&self) -> impl Iterator<Item = &ReflectedTable> {
        self.tables.values()
    }

    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    /// Add or replace a table.
    pub fn insert(&mut self, table: ReflectedTable) {
        self.tables.insert(table.name().to_string(), table);
        self.tables.sort_keys();
    }

    pub fn remove_table(&mut self, name: &str) -> Option<ReflectedTable> {
        self.tables.shift_remove(name)
    }

    /// First table (by name) with foreign keys to both `t1` and `t2`.
    pub fn junction_between(&self, t1: &str, t2: &str) -> Option<&ReflectedTable> {
        self.tables
            .values()
            .find(|t3| !t3.fks_to(t1).is_empty() && !t3.fks_to(t2).is_empty())
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[derive(Serialize, Deserialize)]
struct DatabaseRecord {
    tables: Vec<ReflectedTable>,
}

impl From<DatabaseRecord> for ReflectedDatabase {
    fn from(r: DatabaseRecord) -> Self {
        ReflectedDatabase::new(r.tables)
    }
}

impl From<ReflectedDatabase> for DatabaseRecord {
    fn from(db: ReflectedDatabase) -> Self {
        DatabaseRecord {
            tables: db.tables.into_values().collect(),
        }
    }
}
