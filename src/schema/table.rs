//! Reflected table descriptor.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::column::ReflectedColumn;

/// Table or view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    #[default]
    Table,
    View,
}

impl TableKind {
    /// Normalize a catalog `TABLE_TYPE` value (`BASE TABLE`, `r`, `U `, `view`, ...).
    pub fn from_catalog(value: &str) -> Option<Self> {
        match value.trim() {
            "BASE TABLE" | "r" | "U" | "table" => Some(TableKind::Table),
            "VIEW" | "v" | "V" | "view" => Some(TableKind::View),
            _ => None,
        }
    }
}

/// A table with its columns in ordinal order.
///
/// The primary key is the single column flagged `pk`; a table with zero or
/// several flagged columns has no primary key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TableRecord", into = "TableRecord")]
pub struct ReflectedTable {
    name: String,
    kind: TableKind,
    columns: IndexMap<String, ReflectedColumn>,
    pk: Option<String>,
    fks: IndexMap<String, String>,
}

impl ReflectedTable {
    pub fn new(name: impl Into<String>, kind: TableKind, columns: Vec<ReflectedColumn>) -> Self {
        let pks: Vec<&ReflectedColumn> = columns.iter().filter(|c| c.pk).collect();
        let pk = match pks.as_slice() {
            [only] => Some(only.name.clone()),
            _ => None,
        };
        let fks = columns
            .iter()
            .filter(|c| c.is_fk())
            .map(|c| (c.name.clone(), c.fk.clone()))
            .collect();
        let columns = columns.into_iter().map(|c| (c.name.clone(), c)).collect();
        Self {
            name: name.into(),
            kind,
            columns,
            pk,
            fks,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&ReflectedColumn> {
        self.columns.get(name)
    }

    pub fn columns(&self) -> impl Iterator<Item = &ReflectedColumn> {
        self.columns.values()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.keys().cloned().collect()
    }

    pub fn pk(&self) -> Option<&ReflectedColumn> {
        self.pk.as_ref().and_then(|name| self.columns.get(name))
    }

    /// Foreign key column name -> referenced table name.
    pub fn fks(&self) -> &IndexMap<String, String> {
        &self.fks
    }

    /// Columns of this table that reference `table`.
    pub fn fks_to(&self, table: &str) -> Vec<&ReflectedColumn> {
        self.fks
            .iter()
            .filter(|(_, target)| target.as_str() == table)
            .filter_map(|(column, _)| self.columns.get(column))
            .collect()
    }

    /// Parse a virtual table definition.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[derive(Serialize, Deserialize)]
struct TableRecord {
    name: String,
    #[serde(rename = "type", default)]
    kind: TableKind,
    columns: Vec<ReflectedColumn>,
}

impl From<TableRecord> for ReflectedTable {
    fn from(r: TableRecord) -> Self {
        ReflectedTable::new(r.name, r.kind, r.columns)
    }
}

impl From<ReflectedTable> for TableRecord {
    fn from(t: ReflectedTable) -> Self {
        TableRecord {
            name: t.name,
            kind: t.kind,
            columns: t.columns.into_values().collect(),
        }
    }
}
