//! In-process cache backend.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use super::{CacheResult, SchemaCache};

/// Concurrent map with per-entry expiry.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, (Instant, Vec<u8>)>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SchemaCache for MemoryCache {
    fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let hit = self
            .entries
            .get(key)
            .map(|entry| (entry.0, entry.1.clone()));
        match hit {
            Some((expires_at, value)) if Instant::now() < expires_at => Ok(Some(value)),
            Some(_) => {
                self.entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &[u8], ttl: Duration) -> CacheResult<()> {
        self.entries
            .insert(key.to_string(), (Instant::now() + ttl, value.to_vec()));
        Ok(())
    }

    fn clear(&self) -> CacheResult<()> {
        self.entries.clear();
        Ok(())
    }
}
