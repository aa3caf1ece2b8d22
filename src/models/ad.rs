use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{AdId, TargetingCondition};

/// A persisted ad. Immutable once admitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ad {
    pub id: AdId,
    pub title: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub conditions: TargetingCondition,
}

impl Ad {
    /// Whether `now` falls inside the half-open window `[start_at, end_at)`.
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.start_at <= now && now < self.end_at
    }

    #[must_use]
    pub fn to_search_result(&self) -> SearchResult {
        SearchResult {
            title: self.title.clone(),
            end_at: self.end_at,
        }
    }
}

/// A validated ad that has not been assigned an identity yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAd {
    pub title: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub conditions: TargetingCondition,
}

impl NewAd {
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.start_at <= now && now < self.end_at
    }

    #[must_use]
    pub fn into_ad(self, id: AdId) -> Ad {
        Ad {
            id,
            title: self.title,
            start_at: self.start_at,
            end_at: self.end_at,
            conditions: self.conditions,
        }
    }
}

/// Admin request body, as decoded from JSON before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub conditions: AdConditionsInput,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdConditionsInput {
    #[serde(default)]
    pub age_start: Option<i64>,
    #[serde(default)]
    pub age_end: Option<i64>,
    #[serde(default, alias = "Gender")]
    pub gender: Option<Vec<String>>,
    #[serde(default, alias = "Country")]
    pub country: Option<Vec<String>>,
    #[serde(default, alias = "Platform")]
    pub platform: Option<Vec<String>>,
}

/// Public projection of an ad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub title: String,
    pub end_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
}
