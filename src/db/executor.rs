//! SQL execution boundary.
//!
//! The engine never talks to a driver directly; it hands rendered
//! [`Statement`]s to a [`SqlExecutor`]. Rows come back as JSON objects keyed
//! by column name, in SELECT-list order.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::sql::{Dialect, Statement};

/// One result row.
pub type Row = Map<String, Value>;

/// Result type for executor operations.
pub type ExecutorResult<T> = Result<T, ExecutorError>;

/// Errors raised by an executor.
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    /// SQLite driver failure.
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failure reported by another driver, carrying its message.
    #[error("{0}")]
    Driver(String),

    /// The blocking task running the statement panicked or was cancelled.
    #[error("statement task failed: {0}")]
    Join(String),
}

/// Runs statements against one database.
///
/// # Example
///
/// ```ignore
/// use autocrud::db::SqlExecutor;
///
/// async fn example(executor: &dyn SqlExecutor) -> ExecutorResult<()> {
///     let stmt = Select::from("posts").build(executor.dialect());
///     let rows = executor.query(&stmt).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Dialect the statements must be rendered in.
    fn dialect(&self) -> Dialect;

    /// Run a statement that returns rows.
    async fn query(&self, statement: &Statement) -> ExecutorResult<Vec<Row>>;

    /// Run a statement and return the number of affected rows.
    async fn execute(&self, statement: &Statement) -> ExecutorResult<u64>;
}
