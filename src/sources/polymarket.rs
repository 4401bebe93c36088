//! Polymarket listings.
//!
//! Stub supplier: returns a fixed listing set built against the public site
//! URL. Event pages live under `/event/{id}`.

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use super::RecordSource;
use crate::types::{ProductListing, SourceBatch};

const BASE_URL: &str = "https://polymarket.com";
const SOURCE_NAME: &str = "polymarket";

/// Polymarket supplier.
pub struct PolymarketSource {
    base_url: String,
}

impl PolymarketSource {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// Build against a different site root (mirrors, tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn listings(&self) -> Vec<ProductListing> {
        vec![ProductListing {
            name: "US Presidential Election 2028".to_string(),
            category: "Politics".to_string(),
            price: 0.45,
            url: format!("{}/event/123", self.base_url),
        }]
    }
}

impl Default for PolymarketSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordSource for PolymarketSource {
    async fn fetch_batch(&self) -> Result<SourceBatch> {
        let products = self.listings();
        debug!(source = SOURCE_NAME, count = products.len(), "Listings loaded");
        Ok(SourceBatch::new(SOURCE_NAME, products))
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }
}
