//! Catalog reflection.
//!
//! Runs the dialect's catalog queries through the engine and assembles
//! [`ReflectedTable`]s. Every catalog query binds the database name last,
//! so one reflector works for all dialects.

use serde_json::Value;
use tracing::{debug, info, warn};

use super::column::ReflectedColumn;
use super::converter::{native_size, split_native, TypeConverter};
use super::database::ReflectedDatabase;
use super::table::{ReflectedTable, TableKind};
use crate::db::{GenericDb, Row};
use crate::error::Result;
use crate::sql::{SqlDialect, Statement};

/// Case-insensitive column lookup; drivers disagree on alias casing.
fn field<'r>(row: &'r Row, key: &str) -> Option<&'r Value> {
    row.get(key).or_else(|| {
        row.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    })
}

fn text(row: &Row, key: &str) -> Option<String> {
    match field(row, key)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn number(row: &Row, key: &str) -> Option<u32> {
    match field(row, key)? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn flag(row: &Row, key: &str) -> bool {
    match field(row, key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        Some(Value::String(s)) => matches!(s.trim().to_uppercase().as_str(), "YES" | "TRUE" | "1"),
        _ => false,
    }
}

/// Reads the live schema of one database.
#[derive(Debug, Clone)]
pub struct SchemaReflector {
    db: GenericDb,
    database: String,
    whitelist: Vec<String>,
    converter: TypeConverter,
}

impl SchemaReflector {
    pub fn new(db: GenericDb, database: impl Into<String>) -> Self {
        let converter = TypeConverter::new(db.dialect());
        Self {
            db,
            database: database.into(),
            whitelist: Vec::new(),
            converter,
        }
    }

    /// Only reflect the listed tables. An empty list reflects everything.
    pub fn with_whitelist(mut self, tables: Vec<String>) -> Self {
        self.whitelist = tables;
        self
    }

    pub fn database_name(&self) -> &str {
        &self.database
    }

    /// Exposed tables and views, in catalog order.
    pub async fn table_names(&self) -> Result<Vec<(String, TableKind)>> {
        let dialect = self.db.dialect();
        let statement = Statement::new(
            dialect.tables_sql(),
            vec![Value::String(self.database.clone())],
        );
        let rows = self.db.query(&statement).await?;
        let ignored = dialect.ignored_tables();

        let mut names = Vec::new();
        for row in &rows {
            let Some(name) = text(row, "TABLE_NAME") else {
                continue;
            };
            if ignored.contains(&name.as_str()) {
                continue;
            }
            if !self.whitelist.is_empty() && !self.whitelist.contains(&name) {
                continue;
            }
            let kind = text(row, "TABLE_TYPE")
                .and_then(|t| TableKind::from_catalog(&t))
                .unwrap_or_default();
            names.push((name, kind));
        }
        Ok(names)
    }

    /// Reflect one table. Views carry no keys.
    pub async fn reflect_table(&self, name: &str, kind: TableKind) -> Result<ReflectedTable> {
        let dialect = self.db.dialect();
        let params = vec![
            Value::String(name.to_string()),
            Value::String(self.database.clone()),
        ];

        let column_rows = self
            .db
            .query(&Statement::new(dialect.columns_sql(), params.clone()))
            .await?;

        let (pks, fks) = if kind == TableKind::View {
            (Vec::new(), Vec::new())
        } else {
            let pk_rows = self
                .db
                .query(&Statement::new(dialect.primary_keys_sql(), params.clone()))
                .await?;
            let pks: Vec<String> = pk_rows.iter().filter_map(|r| text(r, "COLUMN_NAME")).collect();
            let fk_rows = self
                .db
                .query(&Statement::new(dialect.foreign_keys_sql(), params))
                .await?;
            let fks: Vec<(String, String)> = fk_rows
                .iter()
                .filter_map(|r| Some((text(r, "COLUMN_NAME")?, text(r, "REFERENCED_TABLE_NAME")?)))
                .collect();
            (pks, fks)
        };

        // Composite keys are not supported: only a lone key column counts.
        let pk = match pks.as_slice() {
            [only] => Some(only.as_str()),
            _ => None,
        };

        let mut columns = Vec::with_capacity(column_rows.len());
        for row in &column_rows {
            let Some(column) = self.reflect_column(name, row)? else {
                continue;
            };
            let fk = fks
                .iter()
                .find(|(col, _)| *col == column.name)
                .map(|(_, target)| target.clone())
                .unwrap_or_default();
            let is_pk = pk == Some(column.name.as_str());
            columns.push(column.primary_key(is_pk).references(fk));
        }

        debug!(table = name, columns = columns.len(), "reflected table");
        Ok(ReflectedTable::new(name, kind, columns))
    }

    fn reflect_column(&self, table: &str, row: &Row) -> Result<Option<ReflectedColumn>> {
        let Some(name) = text(row, "COLUMN_NAME") else {
            return Ok(None);
        };
        let raw = text(row, "DATA_TYPE").unwrap_or_default().to_lowercase();
        if raw.trim().is_empty() {
            warn!(table, column = %name, "skipping column without a declared type");
            return Ok(None);
        }

        let mut length = number(row, "CHARACTER_MAXIMUM_LENGTH");
        let mut precision = number(row, "NUMERIC_PRECISION");
        let mut scale = number(row, "NUMERIC_SCALE");

        let native = if self.db.dialect().reports_sizes_in_type() {
            let (bare, first, second) = split_native(&raw);
            if let Some(first) = first {
                if length.is_some() {
                    length = Some(first);
                } else {
                    precision = Some(first);
                    scale = second;
                }
            }
            bare
        } else {
            raw
        };

        let size = native_size(length, precision, scale);
        let kind = self.converter.to_canonical(&native, &size)?;
        if kind.has_length() {
            length = length.or(precision);
        }

        let column = ReflectedColumn::new(name, kind, length, precision, scale)
            .nullable(flag(row, "IS_NULLABLE"));
        Ok(Some(column))
    }

    /// Reflect every exposed table.
    pub async fn reflect(&self) -> Result<ReflectedDatabase> {
        let names = self.table_names().await?;
        let mut tables = Vec::with_capacity(names.len());
        for (name, kind) in names {
            tables.push(self.reflect_table(&name, kind).await?);
        }
        info!(database = %self.database, tables = tables.len(), "reflected schema");
        Ok(ReflectedDatabase::new(tables))
    }
}
