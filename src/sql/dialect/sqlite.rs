//! SQLite dialect.
//!
//! - Double-quote identifier quoting, `?` placeholders
//! - No default LIKE escape character
//! - Blobs are written through `unhex(?)` and read back raw, base64-encoded by the executor
//! - Decimals come back as REAL, so the engine formats them with the column scale
//! - Catalog comes from `sqlite_master` and the `pragma_*` table functions
//! - ALTER TABLE can rename and add/drop columns, nothing else

use super::helpers;
use super::SqlDialect;
use crate::sql::token::TokenStream;

/// SQLite dialect.
#[derive(Debug, Clone, Copy)]
pub struct Sqlite;

impl SqlDialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn requires_like_escape_clause(&self) -> bool {
        true
    }

    fn formats_decimal_output(&self) -> bool {
        true
    }

    fn binds_binary_as_hex(&self) -> bool {
        true
    }

    fn convert_binary_input(&self, value: TokenStream) -> TokenStream {
        helpers::wrap_function("unhex", &value)
    }

    fn init_statements(&self) -> &'static [&'static str] {
        &["PRAGMA foreign_keys = on"]
    }

    fn tables_sql(&self) -> &'static str {
        "SELECT \"name\" AS \"TABLE_NAME\", \"type\" AS \"TABLE_TYPE\" FROM \"sqlite_master\" \
         WHERE \"type\" IN ('table', 'view') AND ? IS NOT NULL ORDER BY \"name\""
    }

    fn columns_sql(&self) -> &'static str {
        "SELECT \"name\" AS \"COLUMN_NAME\", \
         CASE WHEN \"notnull\" = 1 THEN 'NO' ELSE 'YES' END AS \"IS_NULLABLE\", \
         lower(\"type\") AS \"DATA_TYPE\", NULL AS \"CHARACTER_MAXIMUM_LENGTH\", \
         NULL AS \"NUMERIC_PRECISION\", NULL AS \"NUMERIC_SCALE\" \
         FROM pragma_table_info(?) WHERE ? IS NOT NULL ORDER BY \"cid\""
    }

    fn primary_keys_sql(&self) -> &'static str {
        "SELECT \"name\" AS \"COLUMN_NAME\" FROM pragma_table_info(?) \
         WHERE \"pk\" > 0 AND ? IS NOT NULL ORDER BY \"pk\""
    }

    fn foreign_keys_sql(&self) -> &'static str {
        "SELECT \"from\" AS \"COLUMN_NAME\", \"table\" AS \"REFERENCED_TABLE_NAME\" \
         FROM pragma_foreign_key_list(?) WHERE ? IS NOT NULL"
    }

    fn ignored_tables(&self) -> &'static [&'static str] {
        &["sqlite_sequence"]
    }

    fn reports_sizes_in_type(&self) -> bool {
        true
    }

    fn native_type_map(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("tinyint(1)", "boolean"),
            ("int", "integer"),
            ("bool", "boolean"),
            ("text", "clob"),
            ("real", "double"),
            ("datetime", "timestamp"),
            ("character", "varchar"),
            ("nvarchar", "varchar"),
        ]
    }

    fn ddl_type_map(&self) -> &'static [(&'static str, &'static str)] {
        &[("clob", "text")]
    }

    fn identity_suffix(&self) -> &'static str {
        " PRIMARY KEY AUTOINCREMENT"
    }

    fn identity_declares_primary_key(&self) -> bool {
        true
    }

    fn supports_constraint_changes(&self) -> bool {
        false
    }

    fn emit_retype_column(&self, _table: &str, _column: &str, _definition: &str) -> Option<TokenStream> {
        None
    }

    fn emit_set_nullable(
        &self,
        _table: &str,
        _column: &str,
        _nullable: bool,
        _definition: &str,
    ) -> Option<TokenStream> {
        None
    }
}
