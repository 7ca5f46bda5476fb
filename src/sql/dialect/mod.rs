//! SQL Dialect definitions and formatting rules.
//!
//! This module provides a trait-based abstraction for SQL dialect differences.
//! Each dialect implements `SqlDialect` to handle its specific syntax:
//!
//! - Identifier quoting: `"` (PostgreSQL/SQLite), `` ` `` (MySQL), `[]` (T-SQL)
//! - Placeholders: `?` vs `$n` vs `@Pn`
//! - Pagination: LIMIT/OFFSET vs OFFSET FETCH
//! - Generated keys: RETURNING vs OUTPUT INSERTED vs LAST_INSERT_ID()
//! - Binary and geometry conversion on the way in and out
//! - Catalog queries and native type names for schema reflection
//! - One-statement schema edits
//!
//! The dialect is selected once (from the configured driver) and passed by
//! value; nothing else in the crate switches on the driver name.
//!
//! # Usage
//!
//! ```ignore
//! use autocrud::sql::{Dialect, SqlDialect};
//!
//! let dialect = Dialect::from_driver("pgsql").unwrap();
//! let quoted = dialect.quote_identifier("user");  // "user"
//! let slot = dialect.placeholder(2);               // $2
//! ```
//!
//! # Feature Matrix
//!
//! | Feature | MySQL | PostgreSQL | SQL Server | SQLite |
//! |---------|-------|------------|------------|--------|
//! | RETURNING | ❌ | ✓ | ❌ (OUTPUT) | 3.35+ |
//! | DEFAULT VALUES | ❌ | ✓ | ✓ | ✓ |
//! | LIKE default escape | `\` | `\` | none | none |
//! | DROP ... CASCADE | ✓ | ✓ | ❌ | ❌ |
//! | ALTER COLUMN type/null | CHANGE | ✓ | ✓ | ❌ |
//! | Constraint edits | ✓ | ✓ | ✓ | ❌ |

pub mod helpers;
mod mysql;
mod postgres;
mod sqlite;
mod tsql;

pub use mysql::MySql;
pub use postgres::Postgres;
pub use sqlite::Sqlite;
pub use tsql::TSql;

use super::token::{Token, TokenStream};

/// SQL dialect trait - defines how SQL constructs are rendered.
///
/// Implementations handle dialect-specific syntax differences.
/// The default implementations follow PostgreSQL where the dialects disagree.
pub trait SqlDialect: std::fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    // =========================================================================
    // Identifier and Literal Quoting
    // =========================================================================

    /// Quote an identifier (table, column, alias).
    ///
    /// - PostgreSQL/SQLite: `"identifier"`
    /// - MySQL: `` `identifier` ``
    /// - T-SQL: `[identifier]`
    fn quote_identifier(&self, ident: &str) -> String;

    /// Quote a string literal.
    ///
    /// Only used for trusted names in DDL; values are always bound.
    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_single(s)
    }

    /// Bind placeholder for the 1-based parameter position.
    fn placeholder(&self, position: usize) -> String {
        let _ = position;
        "?".into()
    }

    /// Predicate that is always false (used for malformed `bt`/`in` filters).
    fn false_literal(&self) -> &'static str {
        "FALSE"
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    /// Emit LIMIT/OFFSET or equivalent pagination clause.
    ///
    /// - PostgreSQL/MySQL/SQLite: `LIMIT n OFFSET m` (default)
    /// - T-SQL: `OFFSET m ROWS FETCH NEXT n ROWS ONLY` (override)
    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        helpers::emit_limit_offset_standard(limit, offset)
    }

    /// Whether this dialect requires ORDER BY for OFFSET/LIMIT.
    ///
    /// T-SQL requires ORDER BY when using OFFSET FETCH.
    fn requires_order_by_for_offset(&self) -> bool {
        false
    }

    // =========================================================================
    // Pattern Matching
    // =========================================================================

    /// Whether LIKE needs an explicit `ESCAPE '\'` clause.
    ///
    /// MySQL and PostgreSQL treat backslash as the default escape character.
    fn requires_like_escape_clause(&self) -> bool {
        false
    }

    // =========================================================================
    // Spatial Predicates
    // =========================================================================

    /// Emit a spatial predicate such as `ST_Contains(col, ST_GeomFromText(?))=TRUE`.
    ///
    /// `function` is the predicate without prefix (`Contains`, `IsValid`, ...).
    /// Predicates like `IsValid` take no geometry argument.
    fn emit_spatial_predicate(
        &self,
        function: &str,
        column: &str,
        argument: Option<serde_json::Value>,
    ) -> TokenStream {
        helpers::emit_spatial_predicate_standard(function, column, argument)
    }

    // =========================================================================
    // Value Conversion
    // =========================================================================

    /// Wrap a bound boolean input.
    fn convert_boolean_input(&self, value: TokenStream) -> TokenStream {
        value
    }

    /// Wrap a bound base64 input for a binary column.
    fn convert_binary_input(&self, value: TokenStream) -> TokenStream {
        value
    }

    /// Expression returning a binary column as base64, if the database must encode it.
    fn convert_binary_output(&self, column: &str) -> Option<TokenStream> {
        let _ = column;
        None
    }

    /// Wrap a bound WKT input for a geometry column.
    fn convert_geometry_input(&self, value: TokenStream) -> TokenStream {
        helpers::wrap_function("ST_GeomFromText", &value)
    }

    /// Expression returning a geometry column as WKT.
    fn convert_geometry_output(&self, column: &str) -> Option<TokenStream> {
        let mut col = TokenStream::new();
        col.ident(column);
        Some(helpers::wrap_function("ST_AsText", &col))
    }

    /// Whether decimals come back as floats and must be formatted with the column scale.
    fn formats_decimal_output(&self) -> bool {
        false
    }

    /// Whether binary inputs are bound as hex text for
    /// [`SqlDialect::convert_binary_input`] to decode, instead of base64.
    fn binds_binary_as_hex(&self) -> bool {
        false
    }

    // =========================================================================
    // Generated Keys
    // =========================================================================

    /// Whether this dialect supports the RETURNING clause.
    fn supports_returning(&self) -> bool {
        true
    }

    /// Whether this dialect returns generated keys with `OUTPUT INSERTED.col`.
    fn supports_output_inserted(&self) -> bool {
        false
    }

    /// Follow-up query for the generated key when neither RETURNING nor OUTPUT exist.
    fn last_insert_id_sql(&self) -> Option<&'static str> {
        None
    }

    /// Whether an INSERT without columns is written `DEFAULT VALUES`.
    ///
    /// MySQL uses `VALUES ()` instead.
    fn supports_default_values(&self) -> bool {
        true
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Statements run once per new connection.
    fn init_statements(&self) -> &'static [&'static str] {
        &[]
    }

    // =========================================================================
    // Catalog Reflection
    // =========================================================================

    /// Tables and views. Columns `TABLE_NAME`, `TABLE_TYPE`; binds the database name.
    fn tables_sql(&self) -> &'static str;

    /// Columns of one table in ordinal order. Columns `COLUMN_NAME`, `IS_NULLABLE`,
    /// `DATA_TYPE`, `CHARACTER_MAXIMUM_LENGTH`, `NUMERIC_PRECISION`, `NUMERIC_SCALE`;
    /// binds table name then database name.
    fn columns_sql(&self) -> &'static str;

    /// Primary key columns of one table (`COLUMN_NAME`).
    fn primary_keys_sql(&self) -> &'static str;

    /// Foreign key columns of one table (`COLUMN_NAME`, `REFERENCED_TABLE_NAME`).
    fn foreign_keys_sql(&self) -> &'static str;

    /// System or extension tables that are never exposed.
    fn ignored_tables(&self) -> &'static [&'static str] {
        &[]
    }

    /// Whether `DATA_TYPE` carries the size, e.g. `decimal(10,2)`.
    fn reports_sizes_in_type(&self) -> bool {
        false
    }

    // =========================================================================
    // Type Names
    // =========================================================================

    /// Native type (optionally `type(size)`) to canonical or intermediate type.
    fn native_type_map(&self) -> &'static [(&'static str, &'static str)];

    /// Canonical type to the native name used in DDL.
    fn ddl_type_map(&self) -> &'static [(&'static str, &'static str)] {
        &[]
    }

    // =========================================================================
    // DDL Support
    // =========================================================================

    /// Native type used for an auto-incrementing key column.
    ///
    /// PostgreSQL swaps the type for `serial`/`bigserial`.
    fn identity_type(&self, native: &str) -> String {
        native.to_string()
    }

    /// Suffix appended to an auto-incrementing key column definition.
    fn identity_suffix(&self) -> &'static str {
        ""
    }

    /// Whether the identity suffix already declares the primary key (SQLite).
    fn identity_declares_primary_key(&self) -> bool {
        false
    }

    /// Whether NULL/NOT NULL is left out of column definitions in ALTER statements.
    fn omits_null_on_alter(&self) -> bool {
        false
    }

    /// Whether this dialect supports CASCADE on DROP TABLE.
    fn supports_drop_cascade(&self) -> bool {
        false
    }

    /// Whether ADD takes the COLUMN keyword.
    fn add_column_keyword(&self) -> bool {
        true
    }

    /// Whether primary and foreign key constraints can be changed after creation.
    fn supports_constraint_changes(&self) -> bool {
        true
    }

    /// Rename a table.
    fn emit_rename_table(&self, from: &str, to: &str) -> TokenStream {
        let mut ts = helpers::alter_table(from);
        ts.space()
            .push(Token::Rename)
            .space()
            .push(Token::To)
            .space()
            .ident(to);
        ts
    }

    /// Rename a column. `definition` is the full column definition under the new name.
    fn emit_rename_column(&self, table: &str, from: &str, to: &str, definition: &str) -> TokenStream {
        let _ = definition;
        let mut ts = helpers::alter_table(table);
        ts.space()
            .push(Token::Rename)
            .space()
            .push(Token::Column)
            .space()
            .ident(from)
            .space()
            .push(Token::To)
            .space()
            .ident(to);
        ts
    }

    /// Change a column type. `None` when the dialect cannot alter columns.
    fn emit_retype_column(&self, table: &str, column: &str, definition: &str) -> Option<TokenStream> {
        let mut ts = helpers::alter_column(table, column);
        ts.space().raw("TYPE").space().raw(definition);
        Some(ts)
    }

    /// Change column nullability. `None` when the dialect cannot alter columns.
    fn emit_set_nullable(
        &self,
        table: &str,
        column: &str,
        nullable: bool,
        definition: &str,
    ) -> Option<TokenStream> {
        let _ = definition;
        let mut ts = helpers::alter_column(table, column);
        ts.space()
            .raw(if nullable { "DROP NOT NULL" } else { "SET NOT NULL" });
        Some(ts)
    }

    /// Add a primary key constraint.
    fn emit_add_primary_key(&self, table: &str, column: &str, constraint: &str) -> TokenStream {
        let mut ts = helpers::alter_table(table);
        ts.space()
            .push(Token::Add)
            .space()
            .push(Token::Constraint)
            .space()
            .ident(constraint)
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

    /// Drop a primary key constraint.
    fn emit_drop_primary_key(&self, table: &str, constraint: &str) -> TokenStream {
        helpers::drop_constraint(table, constraint)
    }

    /// Drop a foreign key constraint.
    fn emit_drop_foreign_key(&self, table: &str, constraint: &str) -> TokenStream {
        helpers::drop_constraint(table, constraint)
    }
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    #[default]
    MySql,
    Postgres,
    TSql,
    Sqlite,
}

impl Dialect {
    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::MySql => &MySql,
            Dialect::Postgres => &Postgres,
            Dialect::TSql => &TSql,
            Dialect::Sqlite => &Sqlite,
        }
    }

    /// Parse a configured driver name (`mysql`, `pgsql`, `sqlsrv`, `sqlite`, and aliases).
    pub fn from_driver(driver: &str) -> Option<Self> {
        match driver.to_lowercase().as_str() {
            "mysql" | "mariadb" => Some(Dialect::MySql),
            "pgsql" | "postgres" | "postgresql" => Some(Dialect::Postgres),
            "sqlsrv" | "mssql" | "tsql" | "sqlserver" => Some(Dialect::TSql),
            "sqlite" | "sqlite3" => Some(Dialect::Sqlite),
            _ => None,
        }
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        self.dialect().quote_string(s)
    }

    fn placeholder(&self, position: usize) -> String {
        self.dialect().placeholder(position)
    }

    fn false_literal(&self) -> &'static str {
        self.dialect().false_literal()
    }

    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        self.dialect().emit_limit_offset(limit, offset)
    }

    fn requires_order_by_for_offset(&self) -> bool {
        self.dialect().requires_order_by_for_offset()
    }

    fn requires_like_escape_clause(&self) -> bool {
        self.dialect().requires_like_escape_clause()
    }

    fn emit_spatial_predicate(
        &self,
        function: &str,
        column: &str,
        argument: Option<serde_json::Value>,
    ) -> TokenStream {
        self.dialect()
            .emit_spatial_predicate(function, column, argument)
    }

    fn convert_boolean_input(&self, value: TokenStream) -> TokenStream {
        self.dialect().convert_boolean_input(value)
    }

    fn convert_binary_input(&self, value: TokenStream) -> TokenStream {
        self.dialect().convert_binary_input(value)
    }

    fn convert_binary_output(&self, column: &str) -> Option<TokenStream> {
        self.dialect().convert_binary_output(column)
    }

    fn convert_geometry_input(&self, value: TokenStream) -> TokenStream {
        self.dialect().convert_geometry_input(value)
    }

    fn convert_geometry_output(&self, column: &str) -> Option<TokenStream> {
        self.dialect().convert_geometry_output(column)
    }

    fn formats_decimal_output(&self) -> bool {
        self.dialect().formats_decimal_output()
    }

    fn binds_binary_as_hex(&self) -> bool {
        self.dialect().binds_binary_as_hex()
    }

    fn supports_returning(&self) -> bool {
        self.dialect().supports_returning()
    }

    fn supports_output_inserted(&self) -> bool {
        self.dialect().supports_output_inserted()
    }

    fn last_insert_id_sql(&self) -> Option<&'static str> {
        self.dialect().last_insert_id_sql()
    }

    fn supports_default_values(&self) -> bool {
        self.dialect().supports_default_values()
    }

    fn init_statements(&self) -> &'static [&'static str] {
        self.dialect().init_statements()
    }

    fn tables_sql(&self) -> &'static str {
        self.dialect().tables_sql()
    }

    fn columns_sql(&self) -> &'static str {
        self.dialect().columns_sql()
    }

    fn primary_keys_sql(&self) -> &'static str {
        self.dialect().primary_keys_sql()
    }

    fn foreign_keys_sql(&self) -> &'static str {
        self.dialect().foreign_keys_sql()
    }

    fn ignored_tables(&self) -> &'static [&'static str] {
        self.dialect().ignored_tables()
    }

    fn reports_sizes_in_type(&self) -> bool {
        self.dialect().reports_sizes_in_type()
    }

    fn native_type_map(&self) -> &'static [(&'static str, &'static str)] {
        self.dialect().native_type_map()
    }

    fn ddl_type_map(&self) -> &'static [(&'static str, &'static str)] {
        self.dialect().ddl_type_map()
    }

    fn identity_type(&self, native: &str) -> String {
        self.dialect().identity_type(native)
    }

    fn identity_suffix(&self) -> &'static str {
        self.dialect().identity_suffix()
    }

    fn identity_declares_primary_key(&self) -> bool {
        self.dialect().identity_declares_primary_key()
    }

    fn omits_null_on_alter(&self) -> bool {
        self.dialect().omits_null_on_alter()
    }

    fn supports_drop_cascade(&self) -> bool {
        self.dialect().supports_drop_cascade()
    }

    fn add_column_keyword(&self) -> bool {
        self.dialect().add_column_keyword()
    }

    fn supports_constraint_changes(&self) -> bool {
        self.dialect().supports_constraint_changes()
    }

    fn emit_rename_table(&self, from: &str, to: &str) -> TokenStream {
        self.dialect().emit_rename_table(from, to)
    }

    fn emit_rename_column(&self, table: &str, from: &str, to: &str, definition: &str) -> TokenStream {
        self.dialect()
            .emit_rename_column(table, from, to, definition)
    }

    fn emit_retype_column(&self, table: &str, column: &str, definition: &str) -> Option<TokenStream> {
        self.dialect().emit_retype_column(table, column, definition)
    }

    fn emit_set_nullable(
        &self,
        table: &str,
        column: &str,
        nullable: bool,
        definition: &str,
    ) -> Option<TokenStream> {
        self.dialect()
            .emit_set_nullable(table, column, nullable, definition)
    }

    fn emit_add_primary_key(&self, table: &str, column: &str, constraint: &str) -> TokenStream {
        self.dialect()
            .emit_add_primary_key(table, column, constraint)
    }

    fn emit_drop_primary_key(&self, table: &str, constraint: &str) -> TokenStream {
        self.dialect().emit_drop_primary_key(table, constraint)
    }

    fn emit_drop_foreign_key(&self, table: &str, constraint: &str) -> TokenStream {
        self.dialect().emit_drop_foreign_key(table, constraint)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}

impl std::str::FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dialect::from_driver(s).ok_or_else(|| format!("unsupported driver '{}'", s))
    }
}
