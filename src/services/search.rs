//! Pure helpers for the search orchestrator: cache keys, entry lifetimes and
//! pagination.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::config::CacheConfig;
use crate::domain::{CountryCode, Gender, Platform, SearchFilter};
use crate::models::ad::Ad;

const KEY_PREFIX: &str = "ads:search:v1:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    pub empty_result_ttl: Duration,
    pub key_includes_pagination: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            empty_result_ttl: Duration::seconds(10),
            key_includes_pagination: false,
        }
    }
}

impl From<&CacheConfig> for SearchSettings {
    fn from(config: &CacheConfig) -> Self {
        Self {
            empty_result_ttl: i64::try_from(config.empty_result_ttl_seconds)
                .ok()
                .and_then(Duration::try_seconds)
                .unwrap_or(Duration::MAX),
            key_includes_pagination: config.key_includes_pagination,
        }
    }
}

/// Field order here is the key's field order.
#[derive(Serialize)]
struct KeyFields<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<usize>,
    age: &'a BTreeSet<u8>,
    gender: &'a BTreeSet<Gender>,
    country: &'a BTreeSet<CountryCode>,
    platform: &'a BTreeSet<Platform>,
}

/// Canonical cache key for a normalized filter.
///
/// Sets serialize in sorted order, so equal filters always produce equal keys.
/// Pagination only takes part when `include_pagination` is set.
pub fn cache_key(
    filter: &SearchFilter,
    include_pagination: bool,
) -> Result<String, serde_json::Error> {
    let fields = KeyFields {
        offset: include_pagination.then_some(filter.offset),
        limit: include_pagination.then_some(filter.limit),
        age: &filter.ages,
        gender: &filter.genders,
        country: &filter.countries,
        platform: &filter.platforms,
    };
    Ok(format!("{KEY_PREFIX}{}", serde_json::to_string(&fields)?))
}

/// Time until the soonest `end_at` among `ads`, or `empty_ttl` when there are none.
#[must_use]
pub fn entry_ttl(ads: &[Ad], now: DateTime<Utc>, empty_ttl: Duration) -> Duration {
    ads.iter()
        .map(|ad| ad.end_at)
        .min()
        .map_or(empty_ttl, |soonest| soonest - now)
}

/// The `[offset, offset + limit)` window of `items`, clamped to its length.
#[must_use]
pub fn paginate<T>(items: &[T], offset: usize, limit: usize) -> &[T] {
    if offset >= items.len() {
        return &[];
    }
    let end = offset.saturating_add(limit).min(items.len());
    &items[offset..end]
}
