//! In-memory catalog store.
//!
//! The store owns the current snapshot, an `Arc<Vec<Product>>` guarded by a
//! `parking_lot::RwLock`. A refresh builds a complete new vector and installs
//! it with a single pointer swap, so concurrent readers always observe either
//! the old or the new snapshot in full. The write lock is held only for the
//! swap itself, never across the feed fetch or the per-call delay.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::domain::product::Product;
use crate::errors::CatalogError;
use crate::feed::{FeedError, ProductFeed};

#[derive(Clone, Copy, Debug, Default)]
pub struct CatalogOptions {
    /// Re-fetch the feed on every query instead of serving the cached
    /// snapshot. Intended for demo deployments where the feed is edited live.
    pub reload_on_every_access: bool,
    /// Fixed delay applied to every query, simulating upstream latency for
    /// load testing. Blocks only the calling request.
    pub extra_latency: Duration,
}

pub struct CatalogStore {
    feed: Arc<dyn ProductFeed>,
    snapshot: RwLock<Arc<Vec<Product>>>,
    options: CatalogOptions,
}

impl CatalogStore {
    pub fn new(feed: Arc<dyn ProductFeed>, options: CatalogOptions) -> Self {
        Self { feed, snapshot: RwLock::new(Arc::new(Vec::new())), options }
    }

    /// Fetches the feed and publishes a fresh snapshot.
    ///
    /// Records whose price cannot be normalized are logged and dropped; they
    /// never appear in the snapshot as placeholder entries.
    pub async fn refresh(&self) -> Result<Arc<Vec<Product>>, FeedError> {
        let records = self.feed.fetch().await?;

        let mut products = Vec::with_capacity(records.len());
        let mut dropped = 0usize;
        for record in records {
            match record.into_product() {
                Ok(product) => products.push(product),
                Err(error) => {
                    dropped += 1;
                    warn!(
                        event_name = "catalog.refresh.record_dropped",
                        error = %error,
                        "feed record dropped during catalog refresh"
                    );
                }
            }
        }

        let snapshot = Arc::new(products);
        *self.snapshot.write() = Arc::clone(&snapshot);
        info!(
            event_name = "catalog.refresh.complete",
            product_count = snapshot.len(),
            dropped_count = dropped,
            "catalog snapshot replaced"
        );

        Ok(snapshot)
    }

    /// Returns the snapshot to answer the current query from, refreshing it
    /// first when the reload policy demands it or nothing is loaded yet.
    ///
    /// Feed failures are swallowed here: the store publishes the empty
    /// snapshot and callers observe zero products until a later refresh
    /// succeeds. Each public query calls this exactly once and iterates the
    /// returned reference, so a query never re-enters the feed mid-scan.
    async fn ensure_populated(&self) -> Arc<Vec<Product>> {
        let current = self.snapshot.read().clone();
        if !self.options.reload_on_every_access && !current.is_empty() {
            return current;
        }

        match self.refresh().await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!(
                    event_name = "catalog.refresh.failed",
                    error = %error,
                    "feed fetch failed; serving an empty catalog"
                );
                let empty = Arc::new(Vec::new());
                *self.snapshot.write() = Arc::clone(&empty);
                empty
            }
        }
    }

    /// Full snapshot in feed order. Never fails.
    pub async fn list_products(&self) -> Arc<Vec<Product>> {
        self.simulate_upstream_latency().await;
        self.ensure_populated().await
    }

    pub async fn get_product(&self, id: &str) -> Result<Product, CatalogError> {
        self.simulate_upstream_latency().await;
        let snapshot = self.ensure_populated().await;

        let mut found = None;
        for product in snapshot.iter() {
            if product.id.0 == id {
                // Last listing wins when the feed repeats an offer id.
                found = Some(product);
            }
        }

        found.cloned().ok_or_else(|| CatalogError::NotFound { id: id.to_string() })
    }

    /// Case-insensitive literal substring match over name and description,
    /// in snapshot order. The query is not validated; the empty query matches
    /// every product. Never fails.
    pub async fn search_products(&self, query: &str) -> Vec<Product> {
        self.simulate_upstream_latency().await;
        let snapshot = self.ensure_populated().await;

        let needle = query.to_lowercase();
        snapshot
            .iter()
            .filter(|product| {
                product.name.to_lowercase().contains(&needle)
                    || product.description.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    async fn simulate_upstream_latency(&self) {
        if !self.options.extra_latency.is_zero() {
            tokio::time::sleep(self.options.extra_latency).await;
        }
    }
}
