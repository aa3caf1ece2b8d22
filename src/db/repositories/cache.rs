use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::entities::{prelude::*, search_cache};
use crate::models::ad::Ad;

/// A live search cache row.
#[derive(Debug, Clone)]
pub struct CachedSearch {
    pub ads: Vec<Ad>,
    pub expires_at: DateTime<Utc>,
}

pub struct CacheRepository {
    conn: DatabaseConnection,
}

impl CacheRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_cached_search(
        &self,
        query: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<CachedSearch>> {
        let now = timestamp(now);

        // Opportunistic cleanup
        let _ = SearchCache::delete_many()
            .filter(search_cache::Column::ExpiresAt.lte(now.as_str()))
            .exec(&self.conn)
            .await;

        let entry = SearchCache::find()
            .filter(search_cache::Column::Query.eq(query))
            .filter(search_cache::Column::ExpiresAt.gt(now.as_str()))
            .one(&self.conn)
            .await?;

        let Some(entry) = entry else {
            return Ok(None);
        };

        Ok(Some(CachedSearch {
            ads: serde_json::from_str(&entry.results_json)?,
            expires_at: DateTime::parse_from_rfc3339(&entry.expires_at)?.with_timezone(&Utc),
        }))
    }

    pub async fn cache_search_results(
        &self,
        query: &str,
        ads: &[Ad],
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let active_model = search_cache::ActiveModel {
            query: Set(query.to_string()),
            results_json: Set(serde_json::to_string(ads)?),
            created_at: Set(timestamp(now)),
            expires_at: Set(timestamp(expires_at)),
            ..Default::default()
        };

        SearchCache::insert(active_model)
            .on_conflict(
                OnConflict::column(search_cache::Column::Query)
                    .update_columns([
                        search_cache::Column::ResultsJson,
                        search_cache::Column::CreatedAt,
                        search_cache::Column::ExpiresAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(())
    }

    pub async fn clear(&self) -> Result<u64> {
        let result = SearchCache::delete_many().exec(&self.conn).await?;
        Ok(result.rows_affected)
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
