//! SQLite-backed cache.
//!
//! Stored at `~/.autocrud/cache.db` unless a path is configured. Entries
//! carry an absolute expiry (unix seconds); the file is versioned and
//! cleared when the format changes.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rusqlite::{params, Connection, OptionalExtension};

use super::{CacheError, CacheResult, SchemaCache};

/// Current cache schema version. Bump this when the cache format changes.
const CACHE_VERSION: i32 = 1;

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

/// File-backed schema cache.
pub struct SqliteCache {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteCache").finish_non_exhaustive()
    }
}

impl SqliteCache {
    /// Open or create the cache database at `path`.
    ///
    /// If the cache version doesn't match, it's automatically cleared.
    pub fn open(path: impl AsRef<Path>) -> CacheResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    /// Open an in-memory cache (for testing).
    pub fn open_in_memory() -> CacheResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    /// Default location, `~/.autocrud/cache.db`.
    pub fn default_path() -> CacheResult<PathBuf> {
        let base = dirs::home_dir().ok_or(CacheError::NoCacheDir)?;
        Ok(base.join(".autocrud").join("cache.db"))
    }

    fn init(conn: Connection) -> CacheResult<Self> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS cache (
                key TEXT PRIMARY KEY,
                value BLOB NOT NULL,
                expires_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )?;

        let stored_version: Option<i32> = conn
            .query_row("SELECT value FROM meta WHERE key = 'version'", [], |row| {
                let s: String = row.get(0)?;
                Ok(s.parse().unwrap_or(0))
            })
            .optional()?;

        if stored_version != Some(CACHE_VERSION) {
            conn.execute("DELETE FROM cache", [])?;
            conn.execute(
                "INSERT OR REPLACE INTO meta (key, value) VALUES ('version', ?)",
                params![CACHE_VERSION.to_string()],
            )?;
        }

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> CacheResult<T>) -> CacheResult<T> {
        let conn = self.conn.lock().map_err(|_| CacheError::Poisoned)?;
        f(&conn)
    }

    /// Remove expired entries, returning how many were dropped.
    pub fn purge_expired(&self) -> CacheResult<usize> {
        self.with_conn(|conn| {
            Ok(conn.execute(
                "DELETE FROM cache WHERE expires_at <= ?",
                params![now_secs()],
            )?)
        })
    }
}

impl SchemaCache for SqliteCache {
    fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    "SELECT value FROM cache WHERE key = ? AND expires_at > ?",
                    params![key, now_secs()],
                    |row| row.get(0),
                )
                .optional()?)
        })
    }

    fn set(&self, key: &str, value: &[u8], ttl: Duration) -> CacheResult<()> {
        let expires_at = now_secs().saturating_add(ttl.as_secs() as i64);
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO cache (key, value, expires_at) VALUES (?, ?, ?)",
                params![key, value, expires_at],
            )?;
            Ok(())
        })
    }

    fn clear(&self) -> CacheResult<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM cache", [])?;
            Ok(())
        })
    }
}
