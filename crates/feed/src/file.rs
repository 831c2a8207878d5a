use std::path::PathBuf;

use async_trait::async_trait;
use shelf_core::{FeedError, ProductFeed, RawFeedRecord};
use tracing::debug;

use crate::wire::FeedPage;

/// Product feed read from a local JSON file, in the same page shape the HTTP
/// feed serves. The file is re-read on every fetch so a live edit shows up on
/// the next reload.
pub struct FileFeed {
    path: PathBuf,
}

impl FileFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ProductFeed for FileFeed {
    async fn fetch(&self) -> Result<Vec<RawFeedRecord>, FeedError> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|error| {
            FeedError::Transport(format!("could not read `{}`: {error}", self.path.display()))
        })?;

        let page = serde_json::from_str::<FeedPage>(&raw).map_err(|error| {
            FeedError::Decode(format!("could not parse `{}`: {error}", self.path.display()))
        })?;

        debug!(
            event_name = "feed.file.fetched",
            record_count = page.resources.len(),
            path = %self.path.display(),
            "read product feed file"
        );
        Ok(page.resources)
    }
}
