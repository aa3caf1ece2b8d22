//! Domain service for ad admission and search.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::cache::CacheError;
use crate::domain::{SearchFilter, ValidationError};
use crate::models::ad::{Ad, AdInput, Page, SearchResult};

/// Errors surfaced by [`AdService`].
///
/// `Validation` is the caller's fault. The other two are backend faults and
/// are never retried here.
#[derive(Debug, Error)]
pub enum AdError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AdError {
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<sea_orm::DbErr> for AdError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl From<anyhow::Error> for AdError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(json) = err.downcast_ref::<serde_json::Error>() {
            return Self::Serialization(json.to_string());
        }
        Self::Persistence(format!("{err:#}"))
    }
}

impl From<CacheError> for AdError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::Backend(msg) => Self::Persistence(msg),
            CacheError::Serialization(e) => Self::Serialization(e.to_string()),
        }
    }
}

/// Admission path and search orchestrator.
///
/// Both operations take `now` explicitly; handlers pass the wall clock and
/// tests pass fixed instants.
///
/// # Examples
///
/// ```rust,ignore
/// use adserve::services::{AdError, AdService};
/// use std::sync::Arc;
///
/// async fn example(service: Arc<dyn AdService>) -> Result<(), AdError> {
///     let page = service
///         .search_ads(&Default::default(), chrono::Utc::now())
///         .await?;
///     println!("{} ads", page.items.len());
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait AdService: Send + Sync {
    /// Validates and persists a new ad.
    ///
    /// Flushes the search cache when the ad is already live at `now`.
    ///
    /// # Errors
    ///
    /// - [`AdError::Validation`] on the first violated admission rule
    /// - [`AdError::Persistence`] when the store or cache fails
    async fn create_ad(&self, input: AdInput, now: DateTime<Utc>) -> Result<Ad, AdError>;

    /// Returns one page of active ads matching `filter`, read through the cache.
    ///
    /// # Errors
    ///
    /// Returns [`AdError::Persistence`] or [`AdError::Serialization`] when a
    /// backend fails.
    async fn search_ads(
        &self,
        filter: &SearchFilter,
        now: DateTime<Utc>,
    ) -> Result<Page<SearchResult>, AdError>;
}
