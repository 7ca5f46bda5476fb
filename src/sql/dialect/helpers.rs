//! Shared helper functions for SQL dialect implementations.
//!
//! This module provides reusable building blocks that dialects can compose
//! to implement the `SqlDialect` trait with minimal duplication.

use serde_json::Value;

use super::super::token::{Token, TokenStream};

// =============================================================================
// Identifier Quoting
// =============================================================================

/// Quote identifier with double quotes (ANSI style).
/// Used by: PostgreSQL, SQLite
pub fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote identifier with backticks.
/// Used by: MySQL
pub fn quote_backtick(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

/// Quote identifier with square brackets.
/// Used by: T-SQL (SQL Server, Azure SQL)
pub fn quote_bracket(ident: &str) -> String {
    format!("[{}]", ident.replace(']', "]]"))
}

// =============================================================================
// String Quoting
// =============================================================================

/// Quote string with single quotes (standard SQL).
/// Used by: All dialects
pub fn quote_string_single(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Quote string with N prefix for Unicode (T-SQL).
pub fn quote_string_unicode(s: &str) -> String {
    format!("N'{}'", s.replace('\'', "''"))
}

// =============================================================================
// Placeholders
// =============================================================================

/// `$1`, `$2`, ...
/// Used by: PostgreSQL
pub fn placeholder_dollar(position: usize) -> String {
    format!("${}", position)
}

/// `@P1`, `@P2`, ...
/// Used by: T-SQL (TDS RPC parameter names)
pub fn placeholder_named(position: usize) -> String {
    format!("@P{}", position)
}

// =============================================================================
// Pagination
// =============================================================================

fn count_literal(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Emit LIMIT ... OFFSET ... (standard SQL).
/// Used by: PostgreSQL, MySQL, SQLite
pub fn emit_limit_offset_standard(limit: Option<u64>, offset: Option<u64>) -> TokenStream {
    let mut ts = TokenStream::new();

    if let Some(lim) = limit {
        ts.push(Token::Limit)
            .space()
            .push(Token::LitInt(count_literal(lim)));
    }

    if let Some(off) = offset {
        if limit.is_some() {
            ts.space();
        }
        ts.push(Token::Offset)
            .space()
            .push(Token::LitInt(count_literal(off)));
    }

    ts
}

/// Emit OFFSET ... ROWS FETCH NEXT ... ROWS ONLY (T-SQL style).
/// Used by: T-SQL
/// Note: Requires ORDER BY clause in T-SQL
pub fn emit_limit_offset_tsql(limit: Option<u64>, offset: Option<u64>) -> TokenStream {
    let mut ts = TokenStream::new();

    let off = offset.unwrap_or(0);
    ts.push(Token::Offset)
        .space()
        .push(Token::LitInt(count_literal(off)))
        .space()
        .push(Token::Rows);

    if let Some(lim) = limit {
        ts.space()
            .push(Token::Fetch)
            .space()
            .push(Token::Next)
            .space()
            .push(Token::LitInt(count_literal(lim)))
            .space()
            .push(Token::Rows)
            .space()
            .push(Token::Only);
    }

    ts
}

// =============================================================================
// Expressions
// =============================================================================

/// `NAME(inner)`
pub fn wrap_function(name: &str, inner: &TokenStream) -> TokenStream {
    let mut ts = TokenStream::new();
    ts.push(Token::FunctionName(name.to_string()))
        .lparen()
        .append(inner)
        .rparen();
    ts
}

/// `ST_<function>(col[, ST_GeomFromText(?)])=TRUE`
/// Used by: MySQL, PostgreSQL (PostGIS), SQLite (SpatiaLite)
pub fn emit_spatial_predicate_standard(
    function: &str,
    column: &str,
    argument: Option<Value>,
) -> TokenStream {
    let mut ts = TokenStream::new();
    ts.push(Token::FunctionName(format!("ST_{}", function)))
        .lparen()
        .ident(column);
    if let Some(wkt) = argument {
        let mut param = TokenStream::new();
        param.param(wkt);
        ts.comma()
            .space()
            .append(&wrap_function("ST_GeomFromText", &param));
    }
    ts.rparen().push(Token::Eq).raw("TRUE");
    ts
}

/// `col.ST<function>([geometry::STGeomFromText(?,0)])=1`
/// Used by: T-SQL
pub fn emit_spatial_predicate_tsql(
    function: &str,
    column: &str,
    argument: Option<Value>,
) -> TokenStream {
    let mut ts = TokenStream::new();
    ts.ident(column)
        .push(Token::Dot)
        .raw(&format!("ST{}", function))
        .lparen();
    if let Some(wkt) = argument {
        ts.raw("geometry::STGeomFromText(").param(wkt).raw(",0)");
    }
    ts.rparen().push(Token::Eq).push(Token::LitInt(1));
    ts
}

// =============================================================================
// DDL
// =============================================================================

/// `ALTER TABLE t`
pub fn alter_table(table: &str) -> TokenStream {
    let mut ts = TokenStream::new();
    ts.push(Token::Alter)
        .space()
        .push(Token::Table)
        .space()
        .ident(table);
    ts
}

/// `ALTER TABLE t ALTER COLUMN c`
pub fn alter_column(table: &str, column: &str) -> TokenStream {
    let mut ts = alter_table(table);
    ts.space()
        .push(Token::Alter)
        .space()
        .push(Token::Column)
        .space()
        .ident(column);
    ts
}

/// `ALTER TABLE t CHANGE c new definition` (MySQL column rewrite)
pub fn change_column(table: &str, from: &str, to: &str, definition: &str) -> TokenStream {
    let mut ts = alter_table(table);
    ts.space()
        .raw("CHANGE")
        .space()
        .ident(from)
        .space()
        .ident(to)
        .space()
        .raw(definition);
    ts
}

/// `ALTER TABLE t DROP CONSTRAINT name`
pub fn drop_constraint(table: &str, constraint: &str) -> TokenStream {
    let mut ts = alter_table(table);
    ts.space()
        .push(Token::Drop)
        .space()
        .push(Token::Constraint)
        .space()
        .ident(constraint);
    ts
}

/// `EXEC sp_rename 'old', 'new'[, 'COLUMN']` (T-SQL renames)
pub fn sp_rename(from: &str, to: &str, object_type: Option<&str>) -> TokenStream {
    let mut ts = TokenStream::new();
    ts.raw("EXEC sp_rename")
        .space()
        .push(Token::LitString(from.to_string()))
        .comma()
        .space()
        .push(Token::LitString(to.to_string()));
    if let Some(kind) = object_type {
        ts.comma().space().push(Token::LitString(kind.to_string()));
    }
    ts
}
