//! Key-value cache collaborators for the user read path.
//!
//! The cache is never a source of truth. Every operation reports transport
//! problems as [`CacheError`] and callers are expected to degrade to a plain
//! store read instead of failing.
//!
//! Two backends exist:
//!
//! - **Memory**: a per-process `DashMap` with per-entry expiry
//! - **Redis**: a pooled connection shared by every request

pub mod memory;
pub mod redis_store;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::{CacheBackendKind, CacheConfig};
use crate::domain::UserId;

pub use memory::MemoryCache;
pub use redis_store::RedisCache;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache connection error: {0}")]
    Connection(String),

    #[error("cache command error: {0}")]
    Command(String),
}

#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns `Ok(None)` on a miss or an expired entry.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Stores `value` under `key`, replacing any previous entry.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;

    /// Releases transport resources. Later calls may fail.
    async fn close(&self) {}

    fn backend_name(&self) -> &'static str;
}

/// Builds the cache key of a user: the configured prefix followed by the id.
#[must_use]
pub fn user_key(prefix: &str, id: UserId) -> String {
    format!("{prefix}{id}")
}

/// Creates the configured cache backend.
///
/// If the Redis pool cannot be created or reached at startup, the process
/// falls back to the in-memory cache rather than refusing to start.
pub async fn create_cache_store(config: &CacheConfig) -> Arc<dyn CacheStore> {
    match config.backend {
        CacheBackendKind::Memory => {
            tracing::info!("Using in-memory user cache");
            Arc::new(MemoryCache::new())
        }
        CacheBackendKind::Redis => match RedisCache::connect(config).await {
            Ok(cache) => Arc::new(cache),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Failed to connect to Redis. Falling back to in-memory cache."
                );
                Arc::new(MemoryCache::new())
            }
        },
    }
}
