//! Cache flush command handler

use crate::config::{CacheBackend, Config};
use crate::db::Store;
use crate::state::build_cache;

pub async fn cmd_flush_cache(config: &Config) -> anyhow::Result<()> {
    if config.cache.backend == CacheBackend::Memory {
        println!("The in-memory cache lives inside the server process; restart it to clear.");
        return Ok(());
    }

    let store = Store::with_pool_options(
        &config.general.database_path,
        1,
        1,
        config.general.db_timeout_seconds,
    )
    .await?;

    build_cache(config, &store).flush_all().await?;
    println!("✓ Search cache flushed.");

    Ok(())
}
