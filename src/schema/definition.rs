//! Schema edits.
//!
//! Each operation validates against the current snapshot, runs exactly one
//! DDL statement and refreshes the snapshot before returning.

use std::sync::Arc;

use tracing::info;

use super::column::ReflectedColumn;
use super::converter::TypeConverter;
use super::database::ReflectedDatabase;
use super::service::ReflectionService;
use super::table::ReflectedTable;
use super::types::CanonicalType;
use crate::db::GenericDb;
use crate::error::{Error, Result};
use crate::sql::{ColumnSpec, ForeignKeySpec, SchemaChange};

fn require_table<'d>(db: &'d ReflectedDatabase, table: &str) -> Result<&'d ReflectedTable> {
    db.table(table)
        .ok_or_else(|| Error::TableNotFound(table.to_string()))
}

fn require_column<'t>(table: &'t ReflectedTable, column: &str) -> Result<&'t ReflectedColumn> {
    table
        .column(column)
        .ok_or_else(|| Error::ColumnNotFound(column.to_string()))
}

/// Key column a foreign key to `table` points at.
fn referenced_column(db: &ReflectedDatabase, table: &str) -> Result<String> {
    let target = require_table(db, table)?;
    target
        .pk()
        .map(|pk| pk.name.clone())
        .ok_or_else(|| Error::ColumnNotFound(format!("{table}.<primary key>")))
}

/// Executes schema edits and keeps the reflection snapshot current.
#[derive(Debug, Clone)]
pub struct DefinitionService {
    db: GenericDb,
    reflection: Arc<ReflectionService>,
    converter: TypeConverter,
}

impl DefinitionService {
    pub fn new(db: GenericDb, reflection: Arc<ReflectionService>) -> Self {
        let converter = TypeConverter::new(db.dialect());
        Self {
            db,
            reflection,
            converter,
        }
    }

    /// DDL form of a column, native type included.
    pub fn column_spec(&self, column: &ReflectedColumn) -> ColumnSpec {
        let native = self.converter.ddl_type(column.kind, column.size().as_deref());
        ColumnSpec::new(&column.name, native)
            .nullable(column.nullable)
            .identity(column.pk && column.kind.is_integer())
    }

    async fn apply(&self, change: SchemaChange) -> Result<()> {
        let dialect = self.db.dialect();
        let statement = change
            .build(dialect)
            .ok_or_else(|| Error::UnsupportedOperation {
                operation: change.operation().to_string(),
                dialect: dialect.to_string(),
            })?;
        info!(operation = change.operation(), sql = %statement.sql, "schema change");
        self.db.execute(&statement).await?;
        self.reflection.refresh().await?;
        Ok(())
    }

    pub async fn add_table(&self, table: &ReflectedTable) -> Result<()> {
        let db = self.reflection.database().await?;
        if db.has_table(table.name()) {
            return Err(Error::TableAlreadyExists(table.name().to_string()));
        }
        let mut foreign_keys = Vec::new();
        for (column, references) in table.fks() {
            foreign_keys.push(ForeignKeySpec {
                column: column.clone(),
                references: references.clone(),
                referenced_column: referenced_column(&db, references)?,
            });
        }
        self.apply(SchemaChange::CreateTable {
            table: table.name().to_string(),
            columns: table.columns().map(|c| self.column_spec(c)).collect(),
            primary_key: table.pk().map(|pk| pk.name.clone()),
            foreign_keys,
        })
        .await
    }

    pub async fn remove_table(&self, table: &str) -> Result<()> {
        let db = self.reflection.database().await?;
        require_table(&db, table)?;
        self.apply(SchemaChange::DropTable {
            table: table.to_string(),
        })
        .await
    }

    pub async fn rename_table(&self, table: &str, to: &str) -> Result<()> {
        let db = self.reflection.database().await?;
        require_table(&db, table)?;
        if db.has_table(to) {
            return Err(Error::TableAlreadyExists(to.to_string()));
        }
        self.apply(SchemaChange::RenameTable {
            table: table.to_string(),
            to: to.to_string(),
        })
        .await
    }

    pub async fn add_column(&self, table: &str, column: &ReflectedColumn) -> Result<()> {
        let db = self.reflection.database().await?;
        let t = require_table(&db, table)?;
        if t.has_column(&column.name) {
            return Err(Error::ColumnAlreadyExists(column.name.clone()));
        }
        self.apply(SchemaChange::AddColumn {
            table: table.to_string(),
            column: self.column_spec(column),
        })
        .await
    }

    pub async fn remove_column(&self, table: &str, column: &str) -> Result<()> {
        let db = self.reflection.database().await?;
        require_column(require_table(&db, table)?, column)?;
        self.apply(SchemaChange::DropColumn {
            table: table.to_string(),
            column: column.to_string(),
        })
        .await
    }

    pub async fn rename_column(&self, table: &str, column: &str, to: &str) -> Result<()> {
        let db = self.reflection.database().await?;
        let t = require_table(&db, table)?;
        let current = require_column(t, column)?;
        if t.has_column(to) {
            return Err(Error::ColumnAlreadyExists(to.to_string()));
        }
        self.apply(SchemaChange::RenameColumn {
            table: table.to_string(),
            column: self.column_spec(current),
            to: to.to_string(),
        })
        .await
    }

    /// Change the type of a column. Sizes fall back to the type defaults.
    pub async fn retype_column(
        &self,
        table: &str,
        column: &str,
        kind: CanonicalType,
        length: Option<u32>,
        precision: Option<u32>,
        scale: Option<u32>,
    ) -> Result<()> {
        let db = self.reflection.database().await?;
        let current = require_column(require_table(&db, table)?, column)?;
        let retyped = ReflectedColumn::new(column, kind, length, precision, scale)
            .nullable(current.nullable)
            .primary_key(current.pk);
        self.apply(SchemaChange::RetypeColumn {
            table: table.to_string(),
            column: self.column_spec(&retyped),
        })
        .await
    }

    pub async fn set_column_nullable(&self, table: &str, column: &str, nullable: bool) -> Result<()> {
        let db = self.reflection.database().await?;
        let current = require_column(require_table(&db, table)?, column)?;
        let spec = self.column_spec(current).nullable(nullable);
        self.apply(SchemaChange::SetNullable {
            table: table.to_string(),
            column: spec,
        })
        .await
    }

    pub async fn add_column_foreign_key(&self, table: &str, column: &str, references: &str) -> Result<()> {
        let db = self.reflection.database().await?;
        require_column(require_table(&db, table)?, column)?;
        let referenced_column = referenced_column(&db, references)?;
        self.apply(SchemaChange::AddForeignKey {
            table: table.to_string(),
            column: column.to_string(),
            references: references.to_string(),
            referenced_column,
        })
        .await
    }

    pub async fn remove_column_foreign_key(&self, table: &str, column: &str) -> Result<()> {
        let db = self.reflection.database().await?;
        require_column(require_table(&db, table)?, column)?;
        self.apply(SchemaChange::DropForeignKey {
            table: table.to_string(),
            column: column.to_string(),
        })
        .await
    }

    pub async fn add_column_primary_key(&self, table: &str, column: &str) -> Result<()> {
        let db = self.reflection.database().await?;
        require_column(require_table(&db, table)?, column)?;
        self.apply(SchemaChange::AddPrimaryKey {
            table: table.to_string(),
            column: column.to_string(),
        })
        .await
    }

    pub async fn remove_column_primary_key(&self, table: &str, column: &str) -> Result<()> {
        let db = self.reflection.database().await?;
        require_column(require_table(&db, table)?, column)?;
        self.apply(SchemaChange::DropPrimaryKey {
            table: table.to_string(),
            column: column.to_string(),
        })
        .await
    }
}
