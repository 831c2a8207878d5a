use std::sync::Arc;
use std::time::Duration;

use shelf_core::config::{AppConfig, ConfigError, FeedSource, LoadOptions};
use shelf_core::{CatalogOptions, CatalogStore, FeedError, ProductFeed};
use shelf_feed::{FileFeed, HttpFeed};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub store: Arc<CatalogStore>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("feed client construction failed: {0}")]
    Feed(#[from] FeedError),
}

pub fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config)
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let feed = build_feed(&config)?;
    let store = Arc::new(CatalogStore::new(
        feed,
        CatalogOptions {
            reload_on_every_access: config.catalog.reload_on_every_access,
            extra_latency: Duration::from_millis(config.catalog.extra_latency_ms),
        },
    ));

    info!(
        event_name = "system.bootstrap.catalog_ready",
        feed_source = ?config.feed.source,
        reload_on_every_access = config.catalog.reload_on_every_access,
        extra_latency_ms = config.catalog.extra_latency_ms,
        "catalog store initialized"
    );

    Ok(Application { config, store })
}

fn build_feed(config: &AppConfig) -> Result<Arc<dyn ProductFeed>, BootstrapError> {
    let feed: Arc<dyn ProductFeed> = match config.feed.source {
        FeedSource::Http => Arc::new(HttpFeed::new(
            config.feed.url.clone(),
            config.feed.api_key.clone(),
            Duration::from_secs(config.feed.timeout_secs),
        )?),
        FeedSource::File => Arc::new(FileFeed::new(config.feed.path.clone())),
    };
    Ok(feed)
}
