use std::sync::Arc;

use crate::cache::{CacheStore, create_cache_store};
use crate::config::Config;
use crate::db::{Store, UserRepository};
use crate::services::{
    CachedUserReader, CredentialVerifier, DefaultUserService, ProfilePictureStore, TokenIssuer,
    UserService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub cache: Arc<dyn CacheStore>,

    pub tokens: TokenIssuer,

    pub user_service: Arc<dyn UserService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let cache = create_cache_store(&config.cache).await;

        Self::with_parts(config, store, cache)
    }

    /// Wires the services over an already opened store and cache.
    pub fn with_parts(
        config: Config,
        store: Store,
        cache: Arc<dyn CacheStore>,
    ) -> anyhow::Result<Self> {
        let repository = Arc::new(store.user_repo()) as Arc<dyn UserRepository>;

        let reader = CachedUserReader::new(
            repository.clone(),
            cache.clone(),
            config.cache.key_prefix.clone(),
            config.cache.ttl(),
        );

        let credentials = CredentialVerifier::new(&config.security)
            .map_err(|e| anyhow::anyhow!("Invalid password hashing settings: {e}"))?;
        let tokens = TokenIssuer::from_config(&config.security);
        let pictures = ProfilePictureStore::new(&config.general.uploads_path);

        let user_service = Arc::new(DefaultUserService::new(
            repository,
            reader,
            credentials,
            tokens.clone(),
            pictures,
        )) as Arc<dyn UserService>;

        Ok(Self {
            config: Arc::new(config),
            store,
            cache,
            tokens,
            user_service,
        })
    }

    /// Releases the cache transport and the database pool. Every clone of
    /// the state is unusable afterwards.
    pub async fn shutdown(&self) -> anyhow::Result<()> {
        self.cache.close().await;
        self.store.clone().close().await
    }
}
