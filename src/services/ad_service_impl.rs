//! `SeaORM` implementation of the [`AdService`] trait.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use crate::cache::SearchCache;
use crate::db::Store;
use crate::domain::{SearchFilter, validate_ad};
use crate::models::ad::{Ad, AdInput, Page, SearchResult};
use crate::services::ad_service::{AdError, AdService};
use crate::services::search::{SearchSettings, cache_key, entry_ttl, paginate};

pub struct SeaOrmAdService {
    store: Store,
    cache: Arc<dyn SearchCache>,
    settings: SearchSettings,
}

impl SeaOrmAdService {
    #[must_use]
    pub fn new(store: Store, cache: Arc<dyn SearchCache>, settings: SearchSettings) -> Self {
        Self {
            store,
            cache,
            settings,
        }
    }

    /// Cached result set for `key`, computing and storing it on a miss.
    async fn matching_ads(
        &self,
        key: &str,
        filter: &SearchFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<Ad>, AdError> {
        if let Some(ads) = self.cache.get(key, now).await? {
            metrics::counter!("ad_search_cache_hits_total").increment(1);
            debug!(key, count = ads.len(), "Search cache hit");
            return Ok(ads);
        }

        metrics::counter!("ad_search_cache_misses_total").increment(1);
        let ads = self.store.query_active_matching(filter, now).await?;

        let ttl = entry_ttl(&ads, now, self.settings.empty_result_ttl);
        if ttl > Duration::zero() {
            self.cache.set(key, &ads, ttl, now).await?;
        }
        debug!(
            key,
            count = ads.len(),
            ttl_ms = ttl.num_milliseconds(),
            "Search cache filled"
        );

        Ok(ads)
    }
}

#[async_trait]
impl AdService for SeaOrmAdService {
    #[instrument(skip(self, input), fields(title = %input.title))]
    async fn create_ad(&self, input: AdInput, now: DateTime<Utc>) -> Result<Ad, AdError> {
        let new_ad = validate_ad(&input)?;
        let ad = self.store.insert_ad(&new_ad).await?;
        metrics::counter!("ads_created_total").increment(1);

        if ad.is_active_at(now) {
            // The ad is already committed; a failed flush must not report it as lost.
            match self.cache.flush_all().await {
                Ok(()) => {
                    metrics::counter!("ad_cache_flushes_total").increment(1);
                    info!(id = %ad.id, "Admitted live ad, search cache flushed");
                }
                Err(e) => {
                    metrics::counter!("ad_cache_flush_failures_total").increment(1);
                    error!(id = %ad.id, error = %e, "Admitted live ad, search cache flush failed");
                }
            }
        } else {
            info!(id = %ad.id, start_at = %ad.start_at, "Admitted scheduled ad");
        }

        Ok(ad)
    }

    #[instrument(skip(self, filter), fields(offset = filter.offset, limit = filter.limit))]
    async fn search_ads(
        &self,
        filter: &SearchFilter,
        now: DateTime<Utc>,
    ) -> Result<Page<SearchResult>, AdError> {
        let key = cache_key(filter, self.settings.key_includes_pagination)
            .map_err(|e| AdError::Serialization(e.to_string()))?;

        let ads = self.matching_ads(&key, filter, now).await?;

        Ok(Page {
            items: paginate(&ads, filter.offset, filter.limit)
                .iter()
                .map(Ad::to_search_result)
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheError, MemorySearchCache};
    use crate::models::ad::AdConditionsInput;
    use chrono::TimeZone;

    struct BrokenCache;

    #[async_trait]
    impl SearchCache for BrokenCache {
        async fn get(&self, _: &str, _: DateTime<Utc>) -> Result<Option<Vec<Ad>>, CacheError> {
            Err(CacheError::Backend("connection refused".into()))
        }

        async fn set(
            &self,
            _: &str,
            _: &[Ad],
            _: Duration,
            _: DateTime<Utc>,
        ) -> Result<(), CacheError> {
            Err(CacheError::Backend("connection refused".into()))
        }

        async fn ttl(&self, _: &str, _: DateTime<Utc>) -> Result<Option<Duration>, CacheError> {
            Err(CacheError::Backend("connection refused".into()))
        }

        async fn flush_all(&self) -> Result<(), CacheError> {
            Err(CacheError::Backend("connection refused".into()))
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
    }

    fn input(start: DateTime<Utc>, end: DateTime<Utc>) -> AdInput {
        AdInput {
            title: "Spring sale".into(),
            start_at: Some(start),
            end_at: Some(end),
            conditions: AdConditionsInput::default(),
        }
    }

    async fn service(cache: Arc<dyn SearchCache>) -> SeaOrmAdService {
        let store = Store::in_memory().await.unwrap();
        SeaOrmAdService::new(store, cache, SearchSettings::default())
    }

    #[tokio::test]
    async fn validation_errors_are_client_errors() {
        let service = service(Arc::new(MemorySearchCache::new())).await;
        let mut bad = input(now(), now() + Duration::hours(1));
        bad.title = String::new();

        let err = service.create_ad(bad, now()).await.unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "ad title cannot be empty");
    }

    #[tokio::test]
    async fn scheduled_ad_does_not_touch_cache() {
        let service = service(Arc::new(BrokenCache)).await;
        let later = input(now() + Duration::days(1), now() + Duration::days(2));
        assert!(service.create_ad(later, now()).await.is_ok());
    }

    #[tokio::test]
    async fn flush_failure_still_admits_live_ad_once() {
        let service = service(Arc::new(BrokenCache)).await;

        let live = input(now() - Duration::hours(1), now() + Duration::hours(1));
        let ad = service.create_ad(live, now()).await.unwrap();
        assert_eq!(ad.title, "Spring sale");
        assert_eq!(service.store.count_ads().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn search_cache_failures_are_server_errors() {
        let service = service(Arc::new(BrokenCache)).await;

        let err = service
            .search_ads(&SearchFilter::default(), now())
            .await
            .unwrap_err();
        assert!(!err.is_client_error());
    }

    #[tokio::test]
    async fn sub_millisecond_start_flushes_warm_cache() {
        let cache = Arc::new(MemorySearchCache::new());
        let service = service(cache.clone()).await;
        let filter = SearchFilter::default();

        let page = service.search_ads(&filter, now()).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(cache.len(), 1);

        let almost_now = input(
            now() + Duration::microseconds(500),
            now() + Duration::hours(1) + Duration::microseconds(999),
        );
        let ad = service.create_ad(almost_now, now()).await.unwrap();
        assert!(ad.is_active_at(now()));
        assert_eq!(ad.end_at, now() + Duration::hours(1));
        assert!(cache.is_empty());

        let page = service.search_ads(&filter, now()).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].end_at, ad.end_at);
    }

    #[test]
    fn json_errors_map_to_serialization() {
        let json_err = serde_json::from_str::<Vec<Ad>>("{").unwrap_err();
        let err = AdError::from(anyhow::Error::from(json_err));
        assert!(matches!(err, AdError::Serialization(_)));

        let err = AdError::from(anyhow::anyhow!("disk I/O error"));
        assert!(matches!(err, AdError::Persistence(_)));
    }
}
