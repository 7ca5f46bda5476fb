//! # autocrud
//!
//! Generic CRUD over reflected database tables, compiled to multi-dialect SQL.
//!
//! ## Architecture
//!
//! Tables are never declared: the schema is reflected from the live
//! database and every request is resolved against that snapshot.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │           Request (table, id, params, body)              │
//! │  (filter, include/exclude, order, page/size, join)       │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [record]
//! ┌─────────────────────────────────────────────────────────┐
//! │   RecordService: conditions, columns, ordering, paging   │
//! │   RelationJoiner: belongs-to / has-many / many-to-many   │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [db]
//! ┌─────────────────────────────────────────────────────────┐
//! │   GenericDb + RequestContext (row filters, join limits)  │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [sql]
//! ┌─────────────────────────────────────────────────────────┐
//! │   Statement: SQL text + bind parameters, per dialect     │
//! │   (MySQL, PostgreSQL, SQL Server, SQLite)                │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [SqlExecutor]
//!                       database
//! ```
//!
//! The [`schema`] module reflects and caches the table model that every
//! layer above consults, and applies one-statement schema edits.

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod record;
pub mod schema;
pub mod sql;

pub use error::{Error, ErrorCode, ErrorDocument, Result};

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::db::{GenericDb, JoinLimits, RequestContext, Row, SqlExecutor, SqliteExecutor};
    pub use crate::error::{Error, Result};
    pub use crate::record::{Condition, ListDocument, Params, RecordService};
    pub use crate::schema::{
        DefinitionService, ReflectedColumn, ReflectedDatabase, ReflectedTable, ReflectionService,
        SchemaReflector,
    };
    pub use crate::sql::{Dialect, SqlDialect, Statement};
}
