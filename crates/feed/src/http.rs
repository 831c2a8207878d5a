use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use shelf_core::{FeedError, ProductFeed, RawFeedRecord};
use tracing::debug;

use crate::wire::FeedPage;

/// Remote product feed reached over HTTP.
///
/// Issues one GET per fetch against the configured endpoint, authenticating
/// with a bearer credential when one is configured. Timeouts are enforced by
/// the underlying client; retry policy belongs to the operator, not here.
pub struct HttpFeed {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<SecretString>,
}

impl HttpFeed {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<SecretString>,
        timeout: Duration,
    ) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| FeedError::Transport(error.to_string()))?;

        Ok(Self { client, endpoint: endpoint.into(), api_key })
    }
}

#[async_trait]
impl ProductFeed for HttpFeed {
    async fn fetch(&self) -> Result<Vec<RawFeedRecord>, FeedError> {
        let mut request = self.client.get(&self.endpoint);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        }

        let response = request
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|error| FeedError::Transport(error.to_string()))?;

        let page = response
            .json::<FeedPage>()
            .await
            .map_err(|error| FeedError::Decode(error.to_string()))?;

        debug!(
            event_name = "feed.http.fetched",
            record_count = page.resources.len(),
            "fetched product feed page"
        );
        Ok(page.resources)
    }
}
