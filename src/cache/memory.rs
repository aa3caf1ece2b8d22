use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

use super::{CacheError, SearchCache};
use crate::models::ad::Ad;

#[derive(Debug, Clone)]
struct Entry {
    ads: Arc<Vec<Ad>>,
    expires_at: DateTime<Utc>,
}

/// Process-local cache backed by a concurrent map.
#[derive(Clone, Default)]
pub struct MemorySearchCache {
    entries: Arc<DashMap<String, Entry>>,
}

impl MemorySearchCache {
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

    fn live_entry(&self, key: &str, now: DateTime<Utc>) -> Option<Entry> {
        let entry = self.entries.get(key)?.clone();
        if entry.expires_at > now {
            Some(entry)
        } else {
            self.entries
                .remove_if(key, |_, stale| stale.expires_at <= now);
            None
        }
    }
}

#[async_trait]
impl SearchCache for MemorySearchCache {
    async fn get(&self, key: &str, now: DateTime<Utc>) -> Result<Option<Vec<Ad>>, CacheError> {
        Ok(self
            .live_entry(key, now)
            .map(|entry| entry.ads.as_ref().clone()))
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

        self.entries.retain(|_, entry| entry.expires_at > now);
        self.entries.insert(
            key.to_string(),
            Entry {
                ads: Arc::new(ads.to_vec()),
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    async fn ttl(&self, key: &str, now: DateTime<Utc>) -> Result<Option<Duration>, CacheError> {
        Ok(self.live_entry(key, now).map(|entry| entry.expires_at - now))
    }

    async fn flush_all(&self) -> Result<(), CacheError> {
        let dropped = self.entries.len();
        self.entries.clear();
        debug!(dropped, "Flushed in-memory search cache");
        Ok(())
    }
}
