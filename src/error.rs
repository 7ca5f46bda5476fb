//! Crate error type and the client-facing error taxonomy.

use serde::Serialize;

use crate::cache::CacheError;
use crate::config::SettingsError;
use crate::db::ExecutorError;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure a record, schema or definition operation can surface.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Table '{0}' not found")]
    TableNotFound(String),

    #[error("Column '{0}' not found")]
    ColumnNotFound(String),

    #[error("Record '{0}' not found")]
    RecordNotFound(String),

    #[error("Argument count mismatch in '{ids}': {records} records")]
    ArgumentCountMismatch { ids: usize, records: usize },

    #[error("Table '{0}' already exists")]
    TableAlreadyExists(String),

    #[error("Column '{0}' already exists")]
    ColumnAlreadyExists(String),

    #[error("Duplicate key exception: {0}")]
    DuplicateKey(String),

    #[error("Data integrity violation: {0}")]
    DataIntegrityViolation(String),

    #[error("Unsupported type '{native}' for {dialect}")]
    UnsupportedType { native: String, dialect: String },

    #[error("Unsupported operation on {dialect}: {operation}")]
    UnsupportedOperation { operation: String, dialect: String },

    #[error("Cannot read input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Executor(#[from] ExecutorError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Numeric error code and HTTP status of an error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ErrorCode {
    pub code: u16,
    pub status: u16,
}

impl ErrorCode {
    pub const TABLE_NOT_FOUND: ErrorCode = ErrorCode::new(1001, 404);
    pub const ARGUMENT_COUNT_MISMATCH: ErrorCode = ErrorCode::new(1002, 422);
    pub const RECORD_NOT_FOUND: ErrorCode = ErrorCode::new(1003, 404);
    pub const COLUMN_NOT_FOUND: ErrorCode = ErrorCode::new(1005, 404);
    pub const TABLE_ALREADY_EXISTS: ErrorCode = ErrorCode::new(1006, 409);
    pub const COLUMN_ALREADY_EXISTS: ErrorCode = ErrorCode::new(1007, 409);
    pub const HTTP_MESSAGE_NOT_READABLE: ErrorCode = ErrorCode::new(1008, 422);
    pub const DUPLICATE_KEY: ErrorCode = ErrorCode::new(1009, 409);
    pub const DATA_INTEGRITY_VIOLATION: ErrorCode = ErrorCode::new(1010, 409);
    pub const NOT_FOUND: ErrorCode = ErrorCode::new(9999, 404);

    const fn new(code: u16, status: u16) -> Self {
        Self { code, status }
    }
}

impl Error {
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::TableNotFound(_) => ErrorCode::TABLE_NOT_FOUND,
            Error::ColumnNotFound(_) => ErrorCode::COLUMN_NOT_FOUND,
            Error::RecordNotFound(_) => ErrorCode::RECORD_NOT_FOUND,
            Error::ArgumentCountMismatch { .. } => ErrorCode::ARGUMENT_COUNT_MISMATCH,
            Error::TableAlreadyExists(_) => ErrorCode::TABLE_ALREADY_EXISTS,
            Error::ColumnAlreadyExists(_) => ErrorCode::COLUMN_ALREADY_EXISTS,
            Error::DuplicateKey(_) => ErrorCode::DUPLICATE_KEY,
            Error::DataIntegrityViolation(_) => ErrorCode::DATA_INTEGRITY_VIOLATION,
            Error::InvalidInput(_) => ErrorCode::HTTP_MESSAGE_NOT_READABLE,
            Error::UnsupportedType { .. }
            | Error::UnsupportedOperation { .. }
            | Error::Executor(_)
            | Error::Settings(_)
            | Error::Cache(_) => ErrorCode::NOT_FOUND,
        }
    }

    /// Map a driver failure onto the taxonomy by inspecting its message.
    ///
    /// Errors that are not driver failures are returned unchanged.
    pub fn classify(self) -> Self {
        let Error::Executor(inner) = &self else {
            return self;
        };
        let message = inner.to_string();
        let lowered = message.to_lowercase();
        if lowered.contains("duplicate") || lowered.contains("unique constraint") {
            Error::DuplicateKey(message)
        } else if lowered.contains("default value")
            || lowered.contains("allow nulls")
            || lowered.contains("constraint")
        {
            Error::DataIntegrityViolation(message)
        } else {
            self
        }
    }

    /// Serializable form. `details` carries the source chain in debug mode.
    pub fn to_document(&self, debug: bool) -> ErrorDocument {
        let details = if debug {
            let mut chain = Vec::new();
            let mut source = std::error::Error::source(self);
            while let Some(err) = source {
                chain.push(err.to_string());
                source = err.source();
            }
            (!chain.is_empty()).then(|| chain.join(": "))
        } else {
            None
        };
        ErrorDocument {
            code: self.code().code,
            message: self.to_string(),
            details,
        }
    }
}

/// Error body returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorDocument {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
