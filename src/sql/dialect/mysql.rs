//! MySQL / MariaDB dialect.
//!
//! MySQL differs from the others in several ways:
//! - Backtick identifier quoting
//! - No RETURNING; generated keys come from `SELECT LAST_INSERT_ID()`
//! - Booleans are `tinyint(1)` and need an explicit cast on bind
//! - `COLUMN_TYPE` reports display widths (`tinyint(1)`, `decimal(10,2)`)
//! - Columns are rewritten with `CHANGE` instead of `ALTER COLUMN`

use super::helpers;
use super::SqlDialect;
use crate::sql::token::{Token, TokenStream};

/// MySQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct MySql;

impl SqlDialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_backtick(ident)
    }

    fn convert_boolean_input(&self, value: TokenStream) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.raw("IFNULL(IF(")
            .append(&value)
            .raw(",TRUE,FALSE),NULL)");
        ts
    }

    fn convert_binary_input(&self, value: TokenStream) -> TokenStream {
        helpers::wrap_function("FROM_BASE64", &value)
    }

    fn convert_binary_output(&self, column: &str) -> Option<TokenStream> {
        let mut col = TokenStream::new();
        col.ident(column);
        Some(helpers::wrap_function("TO_BASE64", &col))
    }

    fn supports_returning(&self) -> bool {
        false
    }

    fn last_insert_id_sql(&self) -> Option<&'static str> {
        Some("SELECT LAST_INSERT_ID()")
    }

    fn supports_default_values(&self) -> bool {
        false
    }

    fn init_statements(&self) -> &'static [&'static str] {
        &["SET NAMES utf8mb4", "SET SESSION sql_warnings=1"]
    }

    fn tables_sql(&self) -> &'static str {
        "SELECT `TABLE_NAME`, `TABLE_TYPE` FROM `INFORMATION_SCHEMA`.`TABLES` \
         WHERE `TABLE_TYPE` IN ('BASE TABLE', 'VIEW') AND `TABLE_SCHEMA` = ? \
         ORDER BY BINARY `TABLE_NAME`"
    }

    fn columns_sql(&self) -> &'static str {
        "SELECT `COLUMN_NAME`, `IS_NULLABLE`, `COLUMN_TYPE` AS `DATA_TYPE`, \
         `CHARACTER_MAXIMUM_LENGTH`, `NUMERIC_PRECISION`, `NUMERIC_SCALE` \
         FROM `INFORMATION_SCHEMA`.`COLUMNS` \
         WHERE `TABLE_NAME` = ? AND `TABLE_SCHEMA` = ? ORDER BY `ORDINAL_POSITION`"
    }

    fn primary_keys_sql(&self) -> &'static str {
        "SELECT `COLUMN_NAME` FROM `INFORMATION_SCHEMA`.`KEY_COLUMN_USAGE` \
         WHERE `CONSTRAINT_NAME` = 'PRIMARY' AND `TABLE_NAME` = ? AND `TABLE_SCHEMA` = ?"
    }

    fn foreign_keys_sql(&self) -> &'static str {
        "SELECT `COLUMN_NAME`, `REFERENCED_TABLE_NAME` FROM `INFORMATION_SCHEMA`.`KEY_COLUMN_USAGE` \
         WHERE `REFERENCED_TABLE_NAME` IS NOT NULL AND `TABLE_NAME` = ? AND `TABLE_SCHEMA` = ?"
    }

    fn reports_sizes_in_type(&self) -> bool {
        true
    }

    fn native_type_map(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("tinyint(1)", "boolean"),
            ("bit(1)", "boolean"),
            ("bit", "bigint"),
            ("mediumint", "integer"),
            ("int", "integer"),
            ("year", "integer"),
            ("tinyblob", "blob"),
            ("mediumblob", "blob"),
            ("longblob", "blob"),
            ("tinytext", "clob"),
            ("text", "clob"),
            ("mediumtext", "clob"),
            ("longtext", "clob"),
            ("json", "clob"),
            ("enum", "varchar"),
            ("set", "varchar"),
            ("datetime", "timestamp"),
            ("point", "geometry"),
            ("linestring", "geometry"),
            ("polygon", "geometry"),
            ("multipoint", "geometry"),
            ("multilinestring", "geometry"),
            ("multipolygon", "geometry"),
            ("geometrycollection", "geometry"),
        ]
    }

    fn ddl_type_map(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("clob", "longtext"),
            ("boolean", "tinyint(1)"),
            ("blob", "longblob"),
            ("timestamp", "datetime"),
        ]
    }

    fn identity_suffix(&self) -> &'static str {
        " AUTO_INCREMENT"
    }

    fn supports_drop_cascade(&self) -> bool {
        true
    }

    fn emit_rename_table(&self, from: &str, to: &str) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::Rename)
            .space()
            .push(Token::Table)
            .space()
            .ident(from)
            .space()
            .push(Token::To)
            .space()
            .ident(to);
        ts
    }

    fn emit_rename_column(&self, table: &str, from: &str, to: &str, definition: &str) -> TokenStream {
        helpers::change_column(table, from, to, definition)
    }

    fn emit_retype_column(&self, table: &str, column: &str, definition: &str) -> Option<TokenStream> {
        Some(helpers::change_column(table, column, column, definition))
    }

    fn emit_set_nullable(
        &self,
        table: &str,
        column: &str,
        _nullable: bool,
        definition: &str,
    ) -> Option<TokenStream> {
        Some(helpers::change_column(table, column, column, definition))
    }

    fn emit_add_primary_key(&self, table: &str, column: &str, _constraint: &str) -> TokenStream {
        let mut ts = helpers::alter_table(table);
        ts.space()
            .push(Token::Add)
            .space()
            .push(Token::Primary)
            .space()
            .push(Token::Key)
            .space()
            .lparen()
            .ident(column)
            .rparen();
        ts
    }

    fn emit_drop_primary_key(&self, table: &str, _constraint: &str) -> TokenStream {
        let mut ts = helpers::alter_table(table);
        ts.space()
            .push(Token::Drop)
            .space()
            .push(Token::Primary)
            .space()
            .push(Token::Key);
        ts
    }

    fn emit_drop_foreign_key(&self, table: &str, constraint: &str) -> TokenStream {
        let mut ts = helpers::alter_table(table);
        ts.space()
            .push(Token::Drop)
            .space()
            .push(Token::Foreign)
            .space()
            .push(Token::Key)
            .space()
            .ident(constraint);
        ts
    }
}
