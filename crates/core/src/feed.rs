//! Contract between the catalog and the external product feed.
//!
//! The feed is an opaque collaborator: given no inputs it returns the full
//! ordered list of raw records, or fails as a whole. Transport concerns
//! (HTTP, local files) live in `shelf-feed`; this module owns the wire shape
//! and the conversion of one raw record into one domain product.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::money::{Money, MoneyParseError};
use crate::domain::product::{Product, ProductId};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPrice {
    pub value: String,
    pub currency: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawFeedRecord {
    pub offer_id: String,
    pub title: String,
    pub description: String,
    pub image_link: String,
    pub price: RawPrice,
    pub product_types: Vec<String>,
}

impl RawFeedRecord {
    /// Converts a raw record into a catalog product.
    ///
    /// `product_types` is accepted on the wire but not carried over; the
    /// catalog serves flat, uncategorized entries.
    pub fn into_product(self) -> Result<Product, RecordConversionError> {
        let price = Money::parse(&self.price.value, &self.price.currency).map_err(|source| {
            RecordConversionError::Price { offer_id: self.offer_id.clone(), source }
        })?;

        Ok(Product {
            id: ProductId(self.offer_id),
            name: self.title,
            description: self.description,
            picture: self.image_link,
            price,
        })
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RecordConversionError {
    #[error("offer `{offer_id}` has an unusable price: {source}")]
    Price {
        offer_id: String,
        #[source]
        source: MoneyParseError,
    },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FeedError {
    #[error("feed transport failure: {0}")]
    Transport(String),
    #[error("feed payload could not be decoded: {0}")]
    Decode(String),
}

#[async_trait]
pub trait ProductFeed: Send + Sync {
    async fn fetch(&self) -> Result<Vec<RawFeedRecord>, FeedError>;
}
