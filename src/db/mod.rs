//! Statement execution.
//!
//! - [`executor`] - the `SqlExecutor` boundary every statement goes through
//! - [`sqlite`] - bundled SQLite implementation of that boundary
//! - [`engine`] - `GenericDb`, record operations on reflected tables
//! - [`context`] - per-request conditions and join limits

pub mod context;
pub mod engine;
pub mod executor;
pub mod sqlite;

pub use context::{JoinLimits, RequestContext};
pub use engine::GenericDb;
pub use executor::{ExecutorError, ExecutorResult, Row, SqlExecutor};
pub use sqlite::SqliteExecutor;
