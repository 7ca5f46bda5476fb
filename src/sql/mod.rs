//! SQL generation module.
//!
//! Every statement the crate runs is rendered here, as a token stream that
//! becomes SQL text plus an ordered list of bind parameters:
//!
//! - [`query`] - SELECT and COUNT builders, ORDER BY, OFFSET/LIMIT
//! - [`dml`] - INSERT, UPDATE (plain and increment), DELETE
//! - [`ddl`] - one-statement schema changes
//! - [`conditions`] - renders a [`Condition`](crate::record::Condition) tree to a WHERE clause
//! - [`converter`] - per-column value and expression conversion
//! - [`token`] - Token types for SQL generation
//! - [`dialect`] - SQL dialect implementations

pub mod conditions;
pub mod converter;
pub mod ddl;
pub mod dialect;
pub mod dml;
pub mod query;
pub mod token;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types at the sql module level
pub use conditions::ConditionsBuilder;
pub use converter::ColumnConverter;
pub use ddl::{ColumnSpec, ForeignKeySpec, SchemaChange};
pub use dialect::{Dialect, SqlDialect};
pub use dml::{Assignment, Delete, Insert, Update};
pub use query::{Count, LimitOffset, OrderByExpr, Select, SelectItem, SortDir};
pub use token::{Statement, Token, TokenStream};
