//! Schema snapshot cache.
//!
//! Reflection runs a handful of catalog queries per table, so the reflected
//! schema is cached as an opaque, compressed byte string.
//!
//! # Backends
//!
//! - [`MemoryCache`] - process-local map, entries expire after their TTL
//! - [`SqliteCache`] - file-backed, survives restarts, versioned
//!
//! # Key Format
//!
//! ```text
//! schema:{sha256(driver, database, connection)}  -> zlib(JSON ReflectedDatabase)
//! ```

mod hash;
mod memory;
mod sqlite;

pub use hash::{compute_hash, schema_key};
pub use memory::MemoryCache;
pub use sqlite::SqliteCache;

use std::io::{Read, Write};
use std::time::Duration;

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::{de::DeserializeOwned, Serialize};

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to determine cache directory")]
    NoCacheDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache lock poisoned")]
    Poisoned,
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Key-value store for serialized schema snapshots.
pub trait SchemaCache: Send + Sync {
    /// Value stored under `key`, if present and not expired.
    fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Store `value` under `key` for `ttl`.
    fn set(&self, key: &str, value: &[u8], ttl: Duration) -> CacheResult<()>;

    /// Drop every entry.
    fn clear(&self) -> CacheResult<()>;
}

/// Serialize to JSON and zlib-compress.
pub fn encode<T: Serialize>(value: &T) -> CacheResult<Vec<u8>> {
    let json = serde_json::to_vec(value)?;
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    Ok(encoder.finish()?)
}

/// Inverse of [`encode`].
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> CacheResult<T> {
    let mut json = Vec::new();
    ZlibDecoder::new(bytes).read_to_end(&mut json)?;
    Ok(serde_json::from_slice(&json)?)
}
