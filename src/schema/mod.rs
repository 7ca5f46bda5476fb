//! Schema model, reflection and schema edits.
//!
//! ```text
//! catalog views ──► SchemaReflector ──► ReflectedDatabase ──► ReflectionService
//!                        │                                        │    ▲
//!                  TypeConverter                          SchemaCache  │ refresh
//!                                                                      │
//!                                               DefinitionService ─────┘
//! ```

pub mod column;
pub mod converter;
pub mod database;
pub mod definition;
pub mod reflector;
pub mod service;
pub mod table;
pub mod types;

pub use column::ReflectedColumn;
pub use converter::TypeConverter;
pub use database::ReflectedDatabase;
pub use definition::DefinitionService;
pub use reflector::SchemaReflector;
pub use service::{load_virtual_tables, parse_virtual_tables, ReflectionService};
pub use table::{ReflectedTable, TableKind};
pub use types::CanonicalType;
