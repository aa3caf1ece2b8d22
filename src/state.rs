use std::sync::Arc;
use tracing::info;

use crate::cache::{DatabaseSearchCache, MemorySearchCache, SearchCache};
use crate::config::{CacheBackend, Config};
use crate::db::Store;
use crate::services::{AdService, SeaOrmAdService, SearchSettings};

/// Everything a request handler needs, built once at startup and passed in.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub cache: Arc<dyn SearchCache>,

    pub ad_service: Arc<dyn AdService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
            config.general.db_timeout_seconds,
        )
        .await?;

        Ok(Self::with_store(config, store))
    }

    /// Wires the cache and services around an already connected store.
    #[must_use]
    pub fn with_store(config: Config, store: Store) -> Self {
        let cache = build_cache(&config, &store);
        let ad_service: Arc<dyn AdService> = Arc::new(SeaOrmAdService::new(
            store.clone(),
            cache.clone(),
            SearchSettings::from(&config.cache),
        ));

        Self {
            config: Arc::new(config),
            store,
            cache,
            ad_service,
        }
    }
}

#[must_use]
pub fn build_cache(config: &Config, store: &Store) -> Arc<dyn SearchCache> {
    match config.cache.backend {
        CacheBackend::Memory => {
            info!("Using in-memory search cache");
            Arc::new(MemorySearchCache::new())
        }
        CacheBackend::Database => {
            info!("Using database-backed search cache");
            Arc::new(DatabaseSearchCache::new(store.clone()))
        }
    }
}
