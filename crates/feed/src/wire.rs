use serde::Deserialize;
use shelf_core::RawFeedRecord;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FeedPage {
    #[serde(default)]
    pub resources: Vec<RawFeedRecord>,
}
