//! Cached schema snapshot.
//!
//! The reflected database is shared as an `Arc` behind a read-mostly lock and
//! swapped whole on refresh, so readers never see a half-built snapshot.
//! Snapshots are persisted through a [`SchemaCache`] as compressed JSON.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::database::ReflectedDatabase;
use super::reflector::SchemaReflector;
use super::table::ReflectedTable;
use crate::cache::{self, SchemaCache};
use crate::error::{Error, Result};

struct Snapshot {
    db: Arc<ReflectedDatabase>,
    loaded_at: Instant,
}

/// Parse a JSON array of virtual table definitions.
pub fn parse_virtual_tables(json: &str) -> Result<Vec<ReflectedTable>> {
    serde_json::from_str(json)
        .map_err(|e| Error::InvalidInput(format!("virtual tables: {e}")))
}

/// Read virtual table definitions from a JSON file.
pub fn load_virtual_tables(path: &Path) -> Result<Vec<ReflectedTable>> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| Error::InvalidInput(format!("{}: {e}", path.display())))?;
    parse_virtual_tables(&json)
}

/// Schema access for record and definition operations.
pub struct ReflectionService {
    reflector: SchemaReflector,
    ttl: Duration,
    cache: Option<Arc<dyn SchemaCache>>,
    cache_key: String,
    virtual_tables: Vec<ReflectedTable>,
    snapshot: RwLock<Option<Snapshot>>,
}

impl std::fmt::Debug for ReflectionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReflectionService")
            .field("database", &self.reflector.database_name())
            .field("ttl", &self.ttl)
            .field("cached", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}

impl ReflectionService {
    /// A `ttl` of zero keeps the first snapshot until an explicit refresh
    /// and never persists it.
    pub fn new(reflector: SchemaReflector, ttl: Duration) -> Self {
        Self {
            reflector,
            ttl,
            cache: None,
            cache_key: String::new(),
            virtual_tables: Vec::new(),
            snapshot: RwLock::new(None),
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn SchemaCache>, key: impl Into<String>) -> Self {
        self.cache = Some(cache);
        self.cache_key = key.into();
        self
    }

    /// Tables merged over the reflected ones, replacing same-named tables.
    pub fn with_virtual_tables(mut self, tables: Vec<ReflectedTable>) -> Self {
        self.virtual_tables = tables;
        self
    }

    fn is_fresh(&self, snapshot: &Snapshot) -> bool {
        self.ttl.is_zero() || snapshot.loaded_at.elapsed() < self.ttl
    }

    fn persists(&self) -> bool {
        self.cache.is_some() && !self.ttl.is_zero()
    }

    /// Current snapshot, reloading it when stale.
    pub async fn database(&self) -> Result<Arc<ReflectedDatabase>> {
        {
            let guard = self.snapshot.read().await;
            if let Some(snapshot) = guard.as_ref().filter(|s| self.is_fresh(s)) {
                return Ok(Arc::clone(&snapshot.db));
            }
        }

        let mut guard = self.snapshot.write().await;
        if let Some(snapshot) = guard.as_ref().filter(|s| self.is_fresh(s)) {
            return Ok(Arc::clone(&snapshot.db));
        }
        let db = match self.read_cache() {
            Some(db) => db,
            None => {
                let db = self.reflect().await?;
                self.write_cache(&db);
                db
            }
        };
        let db = Arc::new(db);
        *guard = Some(Snapshot {
            db: Arc::clone(&db),
            loaded_at: Instant::now(),
        });
        Ok(db)
    }

    pub async fn has_table(&self, name: &str) -> Result<bool> {
        Ok(self.database().await?.has_table(name))
    }

    pub async fn table(&self, name: &str) -> Result<Option<ReflectedTable>> {
        Ok(self.database().await?.table(name).cloned())
    }

    pub async fn table_names(&self) -> Result<Vec<String>> {
        Ok(self.database().await?.table_names())
    }

    /// Reflect the live schema again, bypassing the cache.
    pub async fn refresh(&self) -> Result<Arc<ReflectedDatabase>> {
        let mut guard = self.snapshot.write().await;
        let db = self.reflect().await?;
        self.write_cache(&db);
        let db = Arc::new(db);
        *guard = Some(Snapshot {
            db: Arc::clone(&db),
            loaded_at: Instant::now(),
        });
        info!(tables = db.len(), "schema refreshed");
        Ok(db)
    }

    /// Drop a table from the snapshot without reflecting.
    pub async fn remove_table(&self, name: &str) -> Result<bool> {
        let current = self.database().await?;
        let mut guard = self.snapshot.write().await;
        let mut db = (*current).clone();
        let removed = db.remove_table(name).is_some();
        if removed {
            self.write_cache(&db);
            *guard = Some(Snapshot {
                db: Arc::new(db),
                loaded_at: Instant::now(),
            });
        }
        Ok(removed)
    }

    async fn reflect(&self) -> Result<ReflectedDatabase> {
        let mut db = self.reflector.reflect().await?;
        for table in &self.virtual_tables {
            db.insert(table.clone());
        }
        Ok(db)
    }

    fn read_cache(&self) -> Option<ReflectedDatabase> {
        if !self.persists() {
            return None;
        }
        let cache = self.cache.as_ref()?;
        let bytes = match cache.get(&self.cache_key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "schema cache read failed");
                return None;
            }
        };
        match cache::decode(&bytes) {
            Ok(db) => {
                debug!(key = %self.cache_key, "schema loaded from cache");
                Some(db)
            }
            Err(e) => {
                warn!(error = %e, "discarding unreadable schema cache entry");
                None
            }
        }
    }

    fn write_cache(&self, db: &ReflectedDatabase) {
        if !self.persists() {
            return;
        }
        let Some(cache) = self.cache.as_ref() else {
            return;
        };
        let result = cache::encode(db).and_then(|bytes| cache.set(&self.cache_key, &bytes, self.ttl));
        if let Err(e) = result {
            warn!(error = %e, "schema cache write failed");
        }
    }
}
