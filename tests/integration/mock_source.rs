//! Mock record source for integration testing.
//!
//! Provides a deterministic `RecordSource` implementation that returns
//! known listings and counts fetches, all in-memory with no external
//! dependencies.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use prediction_aggregator::sources::RecordSource;
use prediction_aggregator::types::{ProductListing, SourceBatch};

/// A mock source whose listings and failures are controlled from test code.
///
/// Clones share state, so a test can keep a handle after boxing one copy
/// into a pipeline.
#[derive(Clone)]
pub struct MockSource {
    name: String,
    listings: Vec<ProductListing>,
    fetches: Arc<Mutex<u32>>,
    /// If set, every fetch returns this error.
    force_error: Arc<Mutex<Option<String>>>,
}

impl MockSource {
    pub fn new(name: &str, listings: Vec<ProductListing>) -> Self {
        Self {
            name: name.to_string(),
            listings,
            fetches: Arc::new(Mutex::new(0)),
            force_error: Arc::new(Mutex::new(None)),
        }
    }

    /// Build a source from `(name, price)` pairs.
    pub fn with_names(name: &str, items: &[(&str, f64)]) -> Self {
        let listings = items
            .iter()
            .enumerate()
            .map(|(i, (n, price))| ProductListing {
                name: n.to_string(),
                category: "Politics".to_string(),
                price: *price,
                url: format!("https://{name}.example.com/market/{i}"),
            })
            .collect();
        Self::new(name, listings)
    }

    pub fn boxed(&self) -> Box<dyn RecordSource> {
        Box::new(self.clone())
    }

    /// Force all subsequent fetches to fail.
    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn clear_error(&self) {
        *self.force_error.lock().unwrap() = None;
    }

    pub fn fetch_count(&self) -> u32 {
        *self.fetches.lock().unwrap()
    }
}

#[async_trait]
impl RecordSource for MockSource {
    async fn fetch_batch(&self) -> Result<SourceBatch> {
        *self.fetches.lock().unwrap() += 1;
        if let Some(err) = self.force_error.lock().unwrap().as_ref() {
            return Err(anyhow!("{}", err));
        }
        Ok(SourceBatch::new(self.name.clone(), self.listings.clone()))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
