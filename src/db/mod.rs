use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::domain::SearchFilter;
use crate::models::ad::{Ad, NewAd};

pub mod migrator;
pub mod predicate;
pub mod repositories;

pub use repositories::cache::CachedSearch;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1, 10).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
        timeout_seconds: u64,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        // Each connection to an in-memory database is its own database.
        let (max_connections, min_connections) = if is_memory_url(db_url) {
            (1, 1)
        } else {
            let path_str = db_url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
            (max_connections, min_connections)
        };

        let timeout = Duration::from_secs(timeout_seconds);
        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(timeout)
            .acquire_timeout(timeout)
            .sqlx_logging(false);

        // Recycling the only connection would discard an in-memory database.
        if !is_memory_url(db_url) {
            opt.idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(600));
        }

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    /// Fresh private in-memory database with migrations applied.
    pub async fn in_memory() -> Result<Self> {
        Self::with_pool_options("sqlite::memory:", 1, 1, 10).await
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn ad_repo(&self) -> repositories::ad::AdRepository {
        repositories::ad::AdRepository::new(self.conn.clone())
    }

    fn cache_repo(&self) -> repositories::cache::CacheRepository {
        repositories::cache::CacheRepository::new(self.conn.clone())
    }

    /// Persists a validated ad under a fresh id.
    pub async fn insert_ad(&self, ad: &NewAd) -> Result<Ad> {
        self.ad_repo().insert(ad).await
    }

    pub async fn query_active_matching(
        &self,
        filter: &SearchFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<Ad>> {
        self.ad_repo().find_active_matching(filter, now).await
    }

    pub async fn count_active_ads(&self, now: DateTime<Utc>) -> Result<u64> {
        self.ad_repo().count_active(now).await
    }

    pub async fn count_ads(&self) -> Result<u64> {
        self.ad_repo().count_all().await
    }

    pub async fn get_cached_search(
        &self,
        query: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<CachedSearch>> {
        self.cache_repo().get_cached_search(query, now).await
    }

    pub async fn cache_search_results(
        &self,
        query: &str,
        ads: &[Ad],
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.cache_repo()
            .cache_search_results(query, ads, expires_at, now)
            .await
    }

    pub async fn clear_search_cache(&self) -> Result<u64> {
        self.cache_repo().clear().await
    }
}

fn is_memory_url(db_url: &str) -> bool {
    db_url.contains(":memory:") || db_url.contains("mode=memory")
}
