//! Record layer: request parameters in, documents out.
//!
//! ```text
//! Params ─┬─► filters ──► Condition ─┐
//!         ├─► columns ───────────────┤
//!         ├─► ordering ──────────────┼─► GenericDb ──► RelationJoiner ──► ListDocument / Row
//!         └─► pagination ────────────┘
//! ```

pub mod columns;
pub mod condition;
pub mod document;
pub mod filters;
pub mod joiner;
pub mod ordering;
pub mod pagination;
pub mod params;
pub mod path_tree;
pub mod service;

pub use condition::{ColumnOperator, Condition, SpatialOperator};
pub use document::ListDocument;
pub use joiner::RelationJoiner;
pub use params::Params;
pub use path_tree::PathTree;
pub use service::RecordService;
