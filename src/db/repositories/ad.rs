use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::{
    DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;

use crate::db::predicate;
use crate::domain::{AdId, AgeRange, SearchFilter, TargetingCondition};
use crate::entities::{ads, prelude::*};
use crate::models::ad::{Ad, NewAd};

pub struct AdRepository {
    conn: DatabaseConnection,
}

impl AdRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&self, ad: &NewAd) -> Result<Ad> {
        let id = AdId::new();
        let conditions = &ad.conditions;

        let active_model = ads::ActiveModel {
            id: Set(id.to_string()),
            title: Set(ad.title.clone()),
            start_at_ms: Set(ad.start_at.timestamp_millis()),
            end_at_ms: Set(ad.end_at.timestamp_millis()),
            age_start: Set(conditions.age.map(|range| i32::from(range.start()))),
            age_end: Set(conditions.age.map(|range| i32::from(range.end()))),
            genders: Set(encode_values(conditions.genders.as_ref())?),
            countries: Set(encode_values(conditions.countries.as_ref())?),
            platforms: Set(encode_values(conditions.platforms.as_ref())?),
            created_at: Set(Utc::now().to_rfc3339()),
        };

        Ads::insert(active_model)
            .exec_without_returning(&self.conn)
            .await?;

        Ok(ad.clone().into_ad(id))
    }

    /// Active ads passing `filter`, earliest `end_at` first with ties broken by id.
    pub async fn find_active_matching(
        &self,
        filter: &SearchFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<Ad>> {
        let rows = Ads::find()
            .filter(predicate::matching(filter, now))
            .order_by_asc(ads::Column::EndAtMs)
            .order_by_asc(ads::Column::Id)
            .all(&self.conn)
            .await?;

        rows.into_iter().map(map_model_to_ad).collect()
    }

    pub async fn count_active(&self, now: DateTime<Utc>) -> Result<u64> {
        let count = Ads::find()
            .filter(predicate::active_at(now))
            .count(&self.conn)
            .await?;
        Ok(count)
    }

    pub async fn count_all(&self) -> Result<u64> {
        Ok(Ads::find().count(&self.conn).await?)
    }
}

fn map_model_to_ad(model: ads::Model) -> Result<Ad> {
    let id = model
        .id
        .parse::<AdId>()
        .with_context(|| format!("Corrupt ad id: {}", model.id))?;

    let age = match (model.age_start, model.age_end) {
        (Some(start), Some(end)) => Some(decode_age(start, end, &model.id)?),
        (None, None) => None,
        _ => anyhow::bail!("Ad {} has a half-open age range", model.id),
    };

    Ok(Ad {
        id,
        title: model.title,
        start_at: decode_millis(model.start_at_ms)?,
        end_at: decode_millis(model.end_at_ms)?,
        conditions: TargetingCondition {
            age,
            genders: decode_values(model.genders.as_deref())?,
            countries: decode_values(model.countries.as_deref())?,
            platforms: decode_values(model.platforms.as_deref())?,
        },
    })
}

fn decode_age(start: i32, end: i32, id: &str) -> Result<AgeRange> {
    let start = u8::try_from(start).ok();
    let end = u8::try_from(end).ok();
    start
        .zip(end)
        .and_then(|(start, end)| AgeRange::new(start, end))
        .with_context(|| format!("Ad {id} has an out-of-domain age range"))
}

fn decode_millis(ms: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms).with_context(|| format!("Timestamp out of range: {ms}"))
}

fn encode_values<T: Serialize>(values: Option<&BTreeSet<T>>) -> Result<Option<String>> {
    values
        .map(|values| serde_json::to_string(values).map_err(Into::into))
        .transpose()
}

fn decode_values<T: DeserializeOwned + Ord>(raw: Option<&str>) -> Result<Option<BTreeSet<T>>> {
    raw.map(|raw| {
        serde_json::from_str::<BTreeSet<T>>(raw)
            .with_context(|| format!("Corrupt targeting column: {raw}"))
    })
    .transpose()
}
