//! Database check command handler

use chrono::Utc;

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_check(config: &Config) -> anyhow::Result<()> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        1,
        1,
        config.general.db_timeout_seconds,
    )
    .await?;
    store.ping().await?;

    let total = store.count_ads().await?;
    let active = store.count_active_ads(Utc::now()).await?;

    println!("Database: {}", config.general.database_path);
    println!("{:-<50}", "");
    println!("  Status:      reachable, migrations applied");
    println!("  Ads stored:  {total}");
    println!("  Ads live:    {active}");
    println!("  Cache:       {:?}", config.cache.backend);

    Ok(())
}
