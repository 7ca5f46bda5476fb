//! sqlparser checks for generated statements, used by the unit tests.

use sqlparser::dialect::{MsSqlDialect, MySqlDialect, PostgreSqlDialect, SQLiteDialect};
use sqlparser::parser::Parser;

use super::dialect::Dialect;

fn parser_dialect(dialect: Dialect) -> Box<dyn sqlparser::dialect::Dialect> {
    match dialect {
        Dialect::MySql => Box::new(MySqlDialect {}),
        Dialect::Postgres => Box::new(PostgreSqlDialect {}),
        Dialect::TSql => Box::new(MsSqlDialect {}),
        Dialect::Sqlite => Box::new(SQLiteDialect {}),
    }
}

/// Parse `sql` as `dialect`, returning the number of statements.
pub fn validate_sql(sql: &str, dialect: Dialect) -> Result<usize, String> {
    Parser::parse_sql(&*parser_dialect(dialect), sql)
        .map(|statements| statements.len())
        .map_err(|e| format!("{dialect} rejected `{sql}`: {e}"))
}

/// Parse a bare WHERE clause by wrapping it in a SELECT.
pub fn validate_where(clause: &str, dialect: Dialect) -> Result<usize, String> {
    validate_sql(&format!("SELECT 1 FROM t WHERE {clause}"), dialect)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_placeholders_per_dialect() {
        assert_eq!(validate_sql("SELECT `a` FROM `t` WHERE `a` = ?", Dialect::MySql), Ok(1));
        assert_eq!(validate_where("\"a\" = $1", Dialect::Postgres), Ok(1));
        assert_eq!(validate_where("[a] = @P1", Dialect::TSql), Ok(1));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(validate_sql("SELEC a FORM t", Dialect::Sqlite).is_err());
    }
}
