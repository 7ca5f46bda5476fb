//! PostgreSQL dialect (with PostGIS for geometry columns).
//!
//! The trait defaults already follow PostgreSQL; this file fills in
//! numbered placeholders, bytea encoding and the pg_catalog queries.

use super::helpers;
use super::SqlDialect;
use crate::sql::token::{Token, TokenStream};

/// PostgreSQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Postgres;

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn placeholder(&self, position: usize) -> String {
        helpers::placeholder_dollar(position)
    }

    fn convert_binary_input(&self, value: TokenStream) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::FunctionName("decode".into()))
            .lparen()
            .append(&value)
            .comma()
            .space()
            .raw("'base64'")
            .rparen();
        ts
    }

    fn convert_binary_output(&self, column: &str) -> Option<TokenStream> {
        let mut ts = TokenStream::new();
        ts.push(Token::FunctionName("encode".into()))
            .lparen()
            .ident(column)
            .raw("::bytea")
            .comma()
            .space()
            .raw("'base64'")
            .rparen();
        Some(ts)
    }

    fn init_statements(&self) -> &'static [&'static str] {
        &["SET NAMES 'UTF8'"]
    }

    fn tables_sql(&self) -> &'static str {
        "SELECT c.relname AS \"TABLE_NAME\", c.relkind AS \"TABLE_TYPE\" \
         FROM pg_catalog.pg_class c LEFT JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace \
         WHERE c.relkind IN ('r', 'v') AND n.nspname <> 'pg_catalog' \
         AND n.nspname <> 'information_schema' AND n.nspname !~ '^pg_toast' \
         AND pg_catalog.pg_table_is_visible(c.oid) AND '' <> $1 ORDER BY \"TABLE_NAME\""
    }

    fn columns_sql(&self) -> &'static str {
        "SELECT a.attname AS \"COLUMN_NAME\", \
         CASE WHEN a.attnotnull THEN 'NO' ELSE 'YES' END AS \"IS_NULLABLE\", \
         pg_catalog.format_type(a.atttypid, -1) AS \"DATA_TYPE\", \
         CASE WHEN a.atttypmod < 0 THEN NULL ELSE a.atttypmod - 4 END AS \"CHARACTER_MAXIMUM_LENGTH\", \
         CASE WHEN a.atttypid != 1700 THEN NULL ELSE ((a.atttypmod - 4) >> 16) & 65535 END AS \"NUMERIC_PRECISION\", \
         CASE WHEN a.atttypid != 1700 THEN NULL ELSE (a.atttypmod - 4) & 65535 END AS \"NUMERIC_SCALE\" \
         FROM pg_attribute a JOIN pg_class pgc ON pgc.oid = a.attrelid \
         WHERE pgc.relname = $1 AND '' <> $2 AND pgc.relkind IN ('r', 'v') \
         AND pg_catalog.pg_table_is_visible(pgc.oid) AND a.attnum > 0 AND NOT a.attisdropped \
         ORDER BY a.attnum"
    }

    fn primary_keys_sql(&self) -> &'static str {
        "SELECT a.attname AS \"COLUMN_NAME\" FROM pg_attribute a \
         JOIN pg_constraint c ON c.conrelid = a.attrelid AND a.attnum = ANY(c.conkey) \
         JOIN pg_class pgc ON pgc.oid = a.attrelid \
         WHERE pgc.relname = $1 AND '' <> $2 AND pg_catalog.pg_table_is_visible(pgc.oid) \
         AND c.contype = 'p'"
    }

    fn foreign_keys_sql(&self) -> &'static str {
        "SELECT a.attname AS \"COLUMN_NAME\", c.confrelid::regclass::text AS \"REFERENCED_TABLE_NAME\" \
         FROM pg_attribute a \
         JOIN pg_constraint c ON (c.conrelid, c.conkey[1]) = (a.attrelid, a.attnum) \
         JOIN pg_class pgc ON pgc.oid = a.attrelid \
         WHERE pgc.relname = $1 AND '' <> $2 AND pg_catalog.pg_table_is_visible(pgc.oid) \
         AND c.contype = 'f'"
    }

    fn ignored_tables(&self) -> &'static [&'static str] {
        &[
            "spatial_ref_sys",
            "raster_columns",
            "raster_overviews",
            "geography_columns",
            "geometry_columns",
        ]
    }

    fn native_type_map(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("bigserial", "bigint"),
            ("serial", "integer"),
            ("smallserial", "integer"),
            ("bit", "varbinary"),
            ("bit varying", "varbinary"),
            ("bytea", "blob"),
            ("character varying", "varchar"),
            ("character", "char"),
            ("cidr", "varchar"),
            ("inet", "varchar"),
            ("macaddr", "varchar"),
            ("uuid", "char"),
            ("interval", "varchar"),
            ("citext", "clob"),
            ("text", "clob"),
            ("json", "clob"),
            ("jsonb", "clob"),
            ("xml", "clob"),
            ("tsvector", "clob"),
            ("double precision", "double"),
            ("money", "decimal"),
            ("time without time zone", "time"),
            ("time with time zone", "time"),
            ("timestamp without time zone", "timestamp"),
            ("timestamp with time zone", "timestamp"),
            ("box", "geometry"),
            ("circle", "geometry"),
            ("line", "geometry"),
            ("lseg", "geometry"),
            ("path", "geometry"),
            ("point", "geometry"),
            ("polygon", "geometry"),
        ]
    }

    fn ddl_type_map(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("clob", "text"),
            ("blob", "bytea"),
            ("varbinary", "bytea"),
            ("float", "real"),
            ("double", "double precision"),
        ]
    }

    fn identity_type(&self, native: &str) -> String {
        match native {
            "bigint" => "bigserial".into(),
            _ => "serial".into(),
        }
    }

    fn omits_null_on_alter(&self) -> bool {
        true
    }

    fn supports_drop_cascade(&self) -> bool {
        true
    }
}
