//! Read-through cache for search results.
//!
//! Entries hold the full matched ad list for one normalized filter. Every
//! operation takes the caller's clock so expiry is deterministic under test.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::models::ad::Ad;

pub mod database;
pub mod memory;

pub use database::DatabaseSearchCache;
pub use memory::MemorySearchCache;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(String),

    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<anyhow::Error> for CacheError {
    fn from(err: anyhow::Error) -> Self {
        Self::Backend(err.to_string())
    }
}

#[async_trait]
pub trait SearchCache: Send + Sync {
    /// Returns the entry for `key` unless it is absent or expired at `now`.
    async fn get(&self, key: &str, now: DateTime<Utc>) -> Result<Option<Vec<Ad>>, CacheError>;

    /// Stores `ads` under `key`, replacing any previous entry. Non-positive
    /// TTLs are ignored.
    async fn set(
        &self,
        key: &str,
        ads: &[Ad],
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<(), CacheError>;

    /// Remaining lifetime of a live entry.
    async fn ttl(&self, key: &str, now: DateTime<Utc>) -> Result<Option<Duration>, CacheError>;

    /// Drops every entry.
    async fn flush_all(&self) -> Result<(), CacheError>;
}
