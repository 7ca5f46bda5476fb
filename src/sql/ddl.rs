//! DDL support - one statement per schema change.
//!
//! Each [`SchemaChange`] renders to exactly one statement. Changes a dialect
//! cannot express in one statement (SQLite column retyping, constraint
//! edits) render to `None`.
//!
//! # Examples
//!
//! ```ignore
//! use autocrud::sql::{ColumnSpec, Dialect, SchemaChange};
//!
//! let change = SchemaChange::AddColumn {
//!     table: "posts".into(),
//!     column: ColumnSpec::new("title", "varchar(255)").nullable(false),
//! };
//! let stmt = change.build(Dialect::Postgres).unwrap();
//! // ALTER TABLE "posts" ADD COLUMN "title" varchar(255) NOT NULL
//! ```

use super::dialect::{Dialect, SqlDialect};
use super::token::{Statement, Token, TokenStream};

/// Constraint name of a primary key: `{table}_{column}_pkey`.
pub fn primary_key_name(table: &str, column: &str) -> String {
    format!("{}_{}_pkey", table, column)
}

/// Constraint name of a foreign key: `{table}_{column}_fkey`.
pub fn foreign_key_name(table: &str, column: &str) -> String {
    format!("{}_{}_fkey", table, column)
}

// ============================================================================
// Column definition
// ============================================================================

/// A column as written in DDL: name, native type with size, nullability.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "column specs have no effect until used in a SchemaChange"]
pub struct ColumnSpec {
    pub name: String,
    pub native_type: String,
    pub nullable: bool,
    /// Auto-incrementing key column.
    pub identity: bool,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, native_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            native_type: native_type.into(),
            nullable: true,
            identity: false,
        }
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn identity(mut self, identity: bool) -> Self {
        self.identity = identity;
        self
    }

    /// Definition text after the column name, e.g. `varchar(255) NOT NULL`.
    ///
    /// `on_alter` drops the null clause on dialects that change nullability
    /// with a separate statement.
    pub fn definition(&self, dialect: Dialect, on_alter: bool) -> String {
        let mut def = if self.identity {
            format!(
                "{}{}",
                dialect.identity_type(&self.native_type),
                dialect.identity_suffix()
            )
        } else {
            self.native_type.clone()
        };
        if !(on_alter && dialect.omits_null_on_alter()) {
            let not_null = self.identity || !self.nullable;
            def.push_str(if not_null { " NOT NULL" } else { " NULL" });
        }
        def
    }

    fn to_tokens(&self, dialect: Dialect, on_alter: bool) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.ident(&self.name)
            .space()
            .raw(&self.definition(dialect, on_alter));
        ts
    }
}

/// Foreign key in a CREATE TABLE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeySpec {
    pub column: String,
    pub references: String,
    pub referenced_column: String,
}

// ============================================================================
// Schema changes
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaChange {
    CreateTable {
        table: String,
        columns: Vec<ColumnSpec>,
        primary_key: Option<String>,
        foreign_keys: Vec<ForeignKeySpec>,
    },
    DropTable {
        table: String,
    },
    RenameTable {
        table: String,
        to: String,
    },
    AddColumn {
        table: String,
        column: ColumnSpec,
    },
    DropColumn {
        table: String,
        column: String,
    },
    /// `column` is the current definition under the old name.
    RenameColumn {
        table: String,
        column: ColumnSpec,
        to: String,
    },
    /// `column` carries the new type.
    RetypeColumn {
        table: String,
        column: ColumnSpec,
    },
    /// `column` carries the new nullability.
    SetNullable {
        table: String,
        column: ColumnSpec,
    },
    AddForeignKey {
        table: String,
        column: String,
        references: String,
        referenced_column: String,
    },
    DropForeignKey {
        table: String,
        column: String,
    },
    AddPrimaryKey {
        table: String,
        column: String,
    },
    DropPrimaryKey {
        table: String,
        column: String,
    },
}

impl SchemaChange {
    /// Short operation name for logs and errors.
    pub fn operation(&self) -> &'static str {
        match self {
            SchemaChange::CreateTable { .. } => "create table",
            SchemaChange::DropTable { .. } => "drop table",
            SchemaChange::RenameTable { .. } => "rename table",
            SchemaChange::AddColumn { .. } => "add column",
            SchemaChange::DropColumn { .. } => "drop column",
            SchemaChange::RenameColumn { .. } => "rename column",
            SchemaChange::RetypeColumn { .. } => "retype column",
            SchemaChange::SetNullable { .. } => "set column nullability",
            SchemaChange::AddForeignKey { .. } => "add foreign key",
            SchemaChange::DropForeignKey { .. } => "drop foreign key",
            SchemaChange::AddPrimaryKey { .. } => "add primary key",
            SchemaChange::DropPrimaryKey { .. } => "drop primary key",
        }
    }

    /// Render the statement. `None` when the dialect cannot apply the change.
    pub fn to_tokens(&self, dialect: Dialect) -> Option<TokenStream> {
        let ts = match self {
            SchemaChange::CreateTable {
                table,
                columns,
                primary_key,
                foreign_keys,
            } => create_table(dialect, table, columns, primary_key.as_deref(), foreign_keys),
            SchemaChange::DropTable { table } => {
                let mut ts = TokenStream::new();
                ts.push(Token::Drop)
                    .space()
                    .push(Token::Table)
                    .space()
                    .ident(table);
                if dialect.supports_drop_cascade() {
                    ts.space().push(Token::Cascade);
                }
                ts
            }
            SchemaChange::RenameTable { table, to } => dialect.emit_rename_table(table, to),
            SchemaChange::AddColumn { table, column } => {
                let mut ts = alter_table(table);
                ts.space().push(Token::Add).space();
                if dialect.add_column_keyword() {
                    ts.push(Token::Column).space();
                }
                ts.append(&column.to_tokens(dialect, true));
                ts
            }
            SchemaChange::DropColumn { table, column } => {
                let mut ts = alter_table(table);
                ts.space()
                    .push(Token::Drop)
                    .space()
                    .push(Token::Column)
                    .space()
                    .ident(column);
                ts
            }
            SchemaChange::RenameColumn { table, column, to } => dialect.emit_rename_column(
                table,
                &column.name,
                to,
                &column.definition(dialect, true),
            ),
            SchemaChange::RetypeColumn { table, column } => {
                dialect.emit_retype_column(table, &column.name, &column.definition(dialect, true))?
            }
            SchemaChange::SetNullable { table, column } => dialect.emit_set_nullable(
                table,
                &column.name,
                column.nullable,
                &column.definition(dialect, false),
            )?,
            SchemaChange::AddForeignKey {
                table,
                column,
                references,
                referenced_column,
            } => {
                if !dialect.supports_constraint_changes() {
                    return None;
                }
                let mut ts = alter_table(table);
                ts.space()
                    .push(Token::Add)
                    .space()
                    .append(&foreign_key_constraint(table, column, references, referenced_column));
                ts
            }
            SchemaChange::DropForeignKey { table, column } => {
                if !dialect.supports_constraint_changes() {
                    return None;
                }
                dialect.emit_drop_foreign_key(table, &foreign_key_name(table, column))
            }
            SchemaChange::AddPrimaryKey { table, column } => {
                if !dialect.supports_constraint_changes() {
                    return None;
                }
                dialect.emit_add_primary_key(table, column, &primary_key_name(table, column))
            }
            SchemaChange::DropPrimaryKey { table, column } => {
                if !dialect.supports_constraint_changes() {
                    return None;
                }
                dialect.emit_drop_primary_key(table, &primary_key_name(table, column))
            }
        };
        Some(ts)
    }

    pub fn build(&self, dialect: Dialect) -> Option<Statement> {
        self.to_tokens(dialect).map(|ts| ts.build(dialect))
    }
}

fn alter_table(table: &str) -> TokenStream {
    super::dialect::helpers::alter_table(table)
}

fn foreign_key_constraint(
    table: &str,
    column: &str,
    references: &str,
    referenced_column: &str,
) -> TokenStream {
    let mut ts = TokenStream::new();
    ts.push(Token::Constraint)
        .space()
        .ident(&foreign_key_name(table, column))
        .space()
        .push(Token::Foreign)
        .space()
        .push(Token::Key)
        .space()
        .lparen()
        .ident(column)
        .rparen()
        .space()
        .push(Token::References)
        .space()
        .ident(references)
        .space()
        .lparen()
        .ident(referenced_column)
        .rparen();
    ts
}

fn create_table(
    dialect: Dialect,
    table: &str,
    columns: &[ColumnSpec],
    primary_key: Option<&str>,
    foreign_keys: &[ForeignKeySpec],
) -> TokenStream {
    let mut parts: Vec<TokenStream> = columns
        .iter()
        .map(|c| c.to_tokens(dialect, false))
        .collect();

    if let Some(pk) = primary_key {
        let declared_inline = dialect.identity_declares_primary_key()
            && columns.iter().any(|c| c.name == pk && c.identity);
        if !declared_inline {
            let mut ts = TokenStream::new();
            ts.push(Token::Constraint)
                .space()
                .ident(&primary_key_name(table, pk))
                .space()
                .push(Token::Primary)
                .space()
                .push(Token::Key)
                .space()
                .lparen()
                .ident(pk)
                .rparen();
            parts.push(ts);
        }
    }

    for fk in foreign_keys {
        parts.push(foreign_key_constraint(
            table,
            &fk.column,
            &fk.references,
            &fk.referenced_column,
        ));
    }

    let mut ts = TokenStream::new();
    ts.push(Token::Create)
        .space()
        .push(Token::Table)
        .space()
        .ident(table)
        .space()
        .lparen();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            ts.comma().space();
        }
        ts.append(part);
    }
    ts.rparen();
    ts
}

// ============================================================================
// Tests
// ============================================================================
