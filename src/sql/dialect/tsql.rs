//! T-SQL (SQL Server / Azure SQL) dialect.
//!
//! T-SQL has significant differences from the others:
//! - Square bracket identifier quoting (`[name]`)
//! - Named placeholders (`@P1`)
//! - OFFSET FETCH for pagination (requires ORDER BY)
//! - OUTPUT INSERTED instead of RETURNING
//! - No boolean literal, so "false" is `1=0`
//! - Binary data is base64-encoded through `FOR XML`
//! - Geometry uses CLR methods (`col.STContains(...)`)
//! - Renames go through `sp_rename`
//! - LIKE has no default escape character

use serde_json::Value;

use super::helpers;
use super::SqlDialect;
use crate::sql::token::TokenStream;

/// T-SQL (SQL Server) dialect.
#[derive(Debug, Clone, Copy)]
pub struct TSql;

impl SqlDialect for TSql {
    fn name(&self) -> &'static str {
        "tsql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_bracket(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        // T-SQL uses N'...' for Unicode strings
        if !s.is_ascii() {
            helpers::quote_string_unicode(s)
        } else {
            helpers::quote_string_single(s)
        }
    }

    fn placeholder(&self, position: usize) -> String {
        helpers::placeholder_named(position)
    }

    fn false_literal(&self) -> &'static str {
        "1=0"
    }

    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        helpers::emit_limit_offset_tsql(limit, offset)
    }

    fn requires_order_by_for_offset(&self) -> bool {
        true
    }

    fn requires_like_escape_clause(&self) -> bool {
        true
    }

    fn emit_spatial_predicate(
        &self,
        function: &str,
        column: &str,
        argument: Option<Value>,
    ) -> TokenStream {
        helpers::emit_spatial_predicate_tsql(function, column, argument)
    }

    fn convert_binary_input(&self, value: TokenStream) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.raw("CONVERT(XML, ")
            .append(&value)
            .raw(").value('.','varbinary(max)')");
        ts
    }

    fn convert_binary_output(&self, column: &str) -> Option<TokenStream> {
        let mut ts = TokenStream::new();
        ts.raw("CASE WHEN ")
            .ident(column)
            .raw(" IS NULL THEN NULL ELSE (SELECT CAST(")
            .ident(column)
            .raw(" as varbinary(max)) FOR XML PATH(''), BINARY BASE64) END");
        Some(ts)
    }

    fn convert_geometry_input(&self, value: TokenStream) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.raw("geometry::STGeomFromText(").append(&value).raw(",0)");
        ts
    }

    fn convert_geometry_output(&self, column: &str) -> Option<TokenStream> {
        let mut ts = TokenStream::new();
        ts.raw("REPLACE(")
            .ident(column)
            .raw(".STAsText(),' (','(')");
        Some(ts)
    }

    fn supports_returning(&self) -> bool {
        // T-SQL uses OUTPUT instead of RETURNING
        false
    }

    fn supports_output_inserted(&self) -> bool {
        true
    }

    fn tables_sql(&self) -> &'static str {
        "SELECT o.name AS [TABLE_NAME], o.xtype AS [TABLE_TYPE] FROM sysobjects o \
         WHERE o.xtype IN ('U', 'V') AND '' <> @P1 ORDER BY [TABLE_NAME]"
    }

    fn columns_sql(&self) -> &'static str {
        "SELECT c.name AS [COLUMN_NAME], c.is_nullable AS [IS_NULLABLE], t.name AS [DATA_TYPE], \
         CASE WHEN c.max_length = -1 THEN 0 \
         WHEN t.name IN ('nchar', 'nvarchar') THEN c.max_length / 2 \
         ELSE c.max_length END AS [CHARACTER_MAXIMUM_LENGTH], \
         c.precision AS [NUMERIC_PRECISION], c.scale AS [NUMERIC_SCALE] \
         FROM sys.columns c INNER JOIN sys.types t ON c.user_type_id = t.user_type_id \
         WHERE c.object_id = OBJECT_ID(@P1) AND '' <> @P2 ORDER BY c.column_id"
    }

    fn primary_keys_sql(&self) -> &'static str {
        "SELECT c.name AS [COLUMN_NAME] FROM sys.key_constraints kc \
         INNER JOIN sys.objects t ON t.object_id = kc.parent_object_id \
         INNER JOIN sys.index_columns ic ON kc.parent_object_id = ic.object_id AND kc.unique_index_id = ic.index_id \
         INNER JOIN sys.columns c ON ic.object_id = c.object_id AND ic.column_id = c.column_id \
         WHERE kc.type = 'PK' AND t.object_id = OBJECT_ID(@P1) AND '' <> @P2"
    }

    fn foreign_keys_sql(&self) -> &'static str {
        "SELECT COL_NAME(fc.parent_object_id, fc.parent_column_id) AS [COLUMN_NAME], \
         OBJECT_NAME(f.referenced_object_id) AS [REFERENCED_TABLE_NAME] \
         FROM sys.foreign_keys AS f \
         INNER JOIN sys.foreign_key_columns AS fc ON f.object_id = fc.constraint_object_id \
         WHERE f.parent_object_id = OBJECT_ID(@P1) AND '' <> @P2"
    }

    fn native_type_map(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("varbinary(0)", "blob"),
            ("varchar(0)", "clob"),
            ("nvarchar(0)", "clob"),
            ("bit", "boolean"),
            ("int", "integer"),
            ("datetime", "timestamp"),
            ("datetime2", "timestamp"),
            ("smalldatetime", "timestamp"),
            ("datetimeoffset", "timestamp"),
            ("float", "double"),
            ("image", "blob"),
            ("ntext", "clob"),
            ("text", "clob"),
            ("xml", "clob"),
            ("money", "decimal"),
            ("smallmoney", "decimal"),
            ("timestamp", "varbinary"),
            ("rowversion", "varbinary"),
            ("hierarchyid", "varbinary"),
            ("uniqueidentifier", "char"),
            ("sysname", "nvarchar"),
            ("geography", "geometry"),
        ]
    }

    fn ddl_type_map(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("boolean", "bit"),
            ("varchar", "nvarchar"),
            ("clob", "ntext"),
            ("blob", "image"),
            ("time", "time(0)"),
            ("timestamp", "datetime2(0)"),
            ("double", "float"),
            ("float", "real"),
        ]
    }

    fn identity_suffix(&self) -> &'static str {
        " IDENTITY(1,1)"
    }

    fn add_column_keyword(&self) -> bool {
        false
    }

    fn emit_rename_table(&self, from: &str, to: &str) -> TokenStream {
        helpers::sp_rename(from, to, None)
    }

    fn emit_rename_column(&self, table: &str, from: &str, to: &str, _definition: &str) -> TokenStream {
        helpers::sp_rename(&format!("{}.{}", table, from), to, Some("COLUMN"))
    }

    fn emit_retype_column(&self, table: &str, column: &str, definition: &str) -> Option<TokenStream> {
        let mut ts = helpers::alter_column(table, column);
        ts.space().raw(definition);
        Some(ts)
    }

    fn emit_set_nullable(
        &self,
        table: &str,
        column: &str,
        _nullable: bool,
        definition: &str,
    ) -> Option<TokenStream> {
        let mut ts = helpers::alter_column(table, column);
        ts.space().raw(definition);
        Some(ts)
    }
}
