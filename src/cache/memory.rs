use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use super::{CacheError, CacheStore};

/// Inserts between two sweeps of expired entries.
const SWEEP_INTERVAL: u64 = 256;

#[derive(Debug)]
struct CachedEntry {
    data: Vec<u8>,
    expires_at: Instant,
}

impl CachedEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Process-local cache with per-entry expiry.
///
/// Expired entries are dropped when read and swept opportunistically on
/// writes, so the map does not grow with keys that are never read again.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, CachedEntry>,
    writes: AtomicU64,
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| !entry.is_expired(now));
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired(now) {
                return Ok(Some(entry.data.clone()));
            }
            drop(entry);
            self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        let entry = CachedEntry {
            data: value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.insert(key.to_string(), entry);

        if self.writes.fetch_add(1, Ordering::Relaxed) % SWEEP_INTERVAL == SWEEP_INTERVAL - 1 {
            self.purge_expired();
        }
        Ok(())
    }

    async fn close(&self) {
        self.entries.clear();
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
