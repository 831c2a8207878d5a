//! Product feed collaborators.
//!
//! Both sources return the same wire shape, a single page of raw records:
//! `{ "resources": [ ... ] }`. Neither retries; a failed fetch is reported
//! once and the catalog decides how to degrade.

mod file;
mod http;
mod wire;

pub use file::FileFeed;
pub use http::HttpFeed;
