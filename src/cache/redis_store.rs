use async_trait::async_trait;
use deadpool_redis::Pool;
use deadpool_redis::redis::AsyncCommands;
use std::time::Duration;

use super::{CacheError, CacheStore};
use crate::config::CacheConfig;

/// Redis-backed cache shared by every instance pointing at the same server.
#[derive(Clone)]
pub struct RedisCache {
    pool: Pool,
}

impl RedisCache {
    #[must_use]
    pub const fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Creates the pool and checks that one connection can be opened.
    pub async fn connect(config: &CacheConfig) -> Result<Self, CacheError> {
        tracing::info!(url = %redact_url(&config.redis_url), "Connecting to Redis");

        let mut redis_config = deadpool_redis::Config::from_url(&config.redis_url);
        let timeout = Some(Duration::from_millis(config.timeout_ms));
        let mut pool_config = deadpool_redis::PoolConfig::new(config.pool_size);
        pool_config.timeouts.wait = timeout;
        pool_config.timeouts.create = timeout;
        pool_config.timeouts.recycle = timeout;
        redis_config.pool = Some(pool_config);

        let pool = redis_config
            .create_pool(Some(deadpool_redis::Runtime::Tokio1))
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        pool.get()
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        tracing::info!("Connected to Redis");
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        conn.get::<_, Option<Vec<u8>>>(key)
            .await
            .map_err(|e| CacheError::Command(e.to_string()))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        // SETEX rejects a zero expiry.
        let ttl_secs = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, ttl_secs)
            .await
            .map_err(|e| CacheError::Command(e.to_string()))
    }

    async fn close(&self) {
        self.pool.close();
        tracing::info!("Redis pool closed");
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

/// Strips credentials from a Redis URL before it is logged.
fn redact_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("***"));
            }
            parsed.to_string()
        }
        Err(_) => "<unparseable>".to_string(),
    }
}
