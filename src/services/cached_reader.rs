//! Cache-aside read path for users.
//!
//! A hit returns the cached snapshot without touching the store, so a read can
//! be stale for up to one TTL after a write. No write path invalidates or
//! refreshes entries; that window is an accepted trade-off. Every cache
//! failure degrades to a store read.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheStore, user_key};
use crate::db::{RepositoryError, UserRepository};
use crate::domain::{User, UserId};

pub struct CachedUserReader {
    repository: Arc<dyn UserRepository>,
    cache: Arc<dyn CacheStore>,
    key_prefix: String,
    ttl: Duration,
}

impl CachedUserReader {
    #[must_use]
    pub fn new(
        repository: Arc<dyn UserRepository>,
        cache: Arc<dyn CacheStore>,
        key_prefix: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            repository,
            cache,
            key_prefix: key_prefix.into(),
            ttl,
        }
    }

    /// Reads a user, preferring a cached snapshot.
    ///
    /// # Errors
    ///
    /// Only store failures are returned. Cache failures are logged and absorbed.
    pub async fn get_user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let key = user_key(&self.key_prefix, id);

        if let Some(user) = self.lookup(&key).await {
            tracing::debug!(user_id = %id, "User fetched from cache");
            return Ok(Some(user));
        }

        let Some(user) = self.repository.get_user_by_id(id).await? else {
            return Ok(None);
        };

        self.populate(&key, &user).await;

        Ok(Some(user))
    }

    async fn lookup(&self, key: &str) -> Option<User> {
        let backend = self.cache.backend_name();

        let bytes = match self.cache.get(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                metrics::counter!("user_cache_misses_total", "backend" => backend).increment(1);
                return None;
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Error fetching user from cache");
                metrics::counter!("user_cache_errors_total", "op" => "get").increment(1);
                return None;
            }
        };

        match User::from_cache_bytes(&bytes) {
            Ok(user) => {
                metrics::counter!("user_cache_hits_total", "backend" => backend).increment(1);
                Some(user)
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Error deserializing user data from cache");
                metrics::counter!("user_cache_errors_total", "op" => "decode").increment(1);
                None
            }
        }
    }

    /// Best-effort write of a fresh snapshot. Never fails the caller.
    async fn populate(&self, key: &str, user: &User) {
        let bytes = match user.to_cache_bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Error serializing user data for cache");
                return;
            }
        };

        match self.cache.set(key, bytes, self.ttl).await {
            Ok(()) => {
                tracing::debug!(key = %key, ttl_secs = self.ttl.as_secs(), "User cached");
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Error caching user data");
                metrics::counter!("user_cache_errors_total", "op" => "set").increment(1);
            }
        }
    }
}
