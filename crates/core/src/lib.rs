pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod feed;

pub use catalog::{CatalogOptions, CatalogStore};
pub use domain::money::{Money, MoneyParseError};
pub use domain::product::{Product, ProductId};
pub use errors::CatalogError;
pub use feed::{FeedError, ProductFeed, RawFeedRecord, RawPrice, RecordConversionError};
