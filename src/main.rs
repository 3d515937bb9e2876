use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use event_sync::{AppConfig, HttpFeed, MediaStore, Store, SyncJob};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load();
    if config.feed_url.is_empty() {
        bail!("feed_url is not configured; set it in config.json");
    }

    let store = Store::open(config.database_path()).context("opening event store")?;
    let media = MediaStore::new(config.media_root());
    let feed = HttpFeed::new(config.feed_url.as_str());

    let outcome = SyncJob::new(&feed, &store, &media, config.stale_delete_policy())
        .sync()
        .context("event sync failed")?;

    info!(
        created = outcome.created,
        deleted = outcome.deleted,
        "event sync complete"
    );
    Ok(())
}
