//! PredictIt listings.
//!
//! Stub supplier. Market pages live under `/market/{id}` on the `www` host.

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use super::RecordSource;
use crate::types::{ProductListing, SourceBatch};

const BASE_URL: &str = "https://www.predictit.org";
const SOURCE_NAME: &str = "predictit";

pub struct PredictItSource {
    base_url: String,
}

impl PredictItSource {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn listings(&self) -> Vec<ProductListing> {
        vec![ProductListing {
            name: "US Presidential Election 2028".to_string(),
            category: "Politics".to_string(),
            price: 0.44,
            url: format!("{}/market/789", self.base_url),
        }]
    }
}

impl Default for PredictItSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordSource for PredictItSource {
    async fn fetch_batch(&self) -> Result<SourceBatch> {
        let products = self.listings();
        debug!(source = SOURCE_NAME, count = products.len(), "Listings loaded");
        Ok(SourceBatch::new(SOURCE_NAME, products))
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }
}
