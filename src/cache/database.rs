use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use super::{CacheError, SearchCache};
use crate::db::Store;
use crate::models::ad::Ad;

/// Cache entries kept in the `search_cache` table next to the ads.
///
/// Survives restarts and is shared by every process pointed at the same
/// database file.
#[derive(Clone)]
pub struct DatabaseSearchCache {
    store: Store,
}

impl DatabaseSearchCache {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SearchCache for DatabaseSearchCache {
    async fn get(&self, key: &str, now: DateTime<Utc>) -> Result<Option<Vec<Ad>>, CacheError> {
        let cached = self.store.get_cached_search(key, now).await?;
        Ok(cached.map(|entry| entry.ads))
    }

    async fn set(
        &self,
        key: &str,
        ads: &[Ad],
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<(), CacheError> {
        if ttl <= Duration::zero() {
            return Ok(());
        }
        self.store
            .cache_search_results(key, ads, now + ttl, now)
            .await?;
        Ok(())
    }

    async fn ttl(&self, key: &str, now: DateTime<Utc>) -> Result<Option<Duration>, CacheError> {
        let cached = self.store.get_cached_search(key, now).await?;
        Ok(cached.map(|entry| entry.expires_at - now))
    }

    async fn flush_all(&self) -> Result<(), CacheError> {
        let dropped = self.store.clear_search_cache().await?;
        debug!(dropped, "Flushed search cache table");
        Ok(())
    }
}
