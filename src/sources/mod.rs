//! Source record suppliers.
//!
//! Defines the `RecordSource` trait and provides stub implementations for:
//! - Polymarket
//! - Kalshi
//! - PredictIt
//!
//! The built-in suppliers return fixed listings; no network I/O is done.

pub mod kalshi;
pub mod polymarket;
pub mod predictit;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::SourcesConfig;
use crate::types::SourceBatch;

use kalshi::KalshiSource;
use polymarket::PolymarketSource;
use predictit::PredictItSource;

/// Abstraction over the sites listings are collected from.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch every listing this source currently offers.
    async fn fetch_batch(&self) -> Result<SourceBatch>;

    /// Source identifier attached to each record.
    fn name(&self) -> &str;
}

/// Build the enabled suppliers, in Polymarket → Kalshi → PredictIt order.
pub fn build_sources(cfg: &SourcesConfig) -> Vec<Box<dyn RecordSource>> {
    let mut sources: Vec<Box<dyn RecordSource>> = Vec::new();

    if cfg.polymarket.enabled {
        sources.push(Box::new(PolymarketSource::new()));
    }
    if cfg.kalshi.enabled {
        sources.push(Box::new(KalshiSource::new()));
    }
    if cfg.predictit.enabled {
        sources.push(Box::new(PredictItSource::new()));
    }

    debug!(count = sources.len(), "Sources built");
    sources
}

/// Fetch from every source one after another, in the given order.
///
/// The first failure aborts the collection.
pub async fn collect_all(sources: &[Box<dyn RecordSource>]) -> Result<Vec<SourceBatch>> {
    let mut batches = Vec::with_capacity(sources.len());

    for source in sources {
        let batch = source
            .fetch_batch()
            .await
            .with_context(|| format!("Failed to fetch from {}", source.name()))?;

        info!(
            source = %batch.source,
            listings = batch.products.len(),
            "Source fetched"
        );
        batches.push(batch);
    }

    Ok(batches)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SourceToggle, SourcesConfig};
    use crate::types::ProductListing;

    fn all_enabled() -> SourcesConfig {
        SourcesConfig::default()
    }

    #[test]
    fn test_build_sources_order() {
        let sources = build_sources(&all_enabled());
        let names: Vec<&str> = sources.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["polymarket", "kalshi", "predictit"]);
    }

    #[test]
    fn test_build_sources_respects_toggles() {
        let cfg = SourcesConfig {
            kalshi: SourceToggle { enabled: false },
            ..SourcesConfig::default()
        };
        let sources = build_sources(&cfg);
        let names: Vec<&str> = sources.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["polymarket", "predictit"]);
    }

    #[tokio::test]
    async fn test_collect_all_builtin() {
        let batches = collect_all(&build_sources(&all_enabled())).await.unwrap();
        assert_eq!(batches.len(), 3);
        assert!(batches.iter().all(|b| b.products.len() == 1));
        assert_eq!(batches[0].source, "polymarket");
        assert_eq!(batches[2].source, "predictit");
    }

    #[tokio::test]
    async fn test_collect_all_empty() {
        let batches = collect_all(&[]).await.unwrap();
        assert!(batches.is_empty());
    }

    #[tokio::test]
    async fn test_collect_all_propagates_failure() {
        let mut ok = MockRecordSource::new();
        ok.expect_fetch_batch().times(1).returning(|| {
            Ok(SourceBatch::new(
                "mock",
                vec![ProductListing {
                    name: "X".into(),
                    category: "Other".into(),
                    price: 0.5,
                    url: String::new(),
                }],
            ))
        });
        ok.expect_name().return_const("mock".to_string());

        let mut failing = MockRecordSource::new();
        failing
            .expect_fetch_batch()
            .times(1)
            .returning(|| Err(anyhow::anyhow!("site unreachable")));
        failing.expect_name().return_const("broken".to_string());

        let sources: Vec<Box<dyn RecordSource>> = vec![Box::new(ok), Box::new(failing)];
        let err = collect_all(&sources).await.unwrap_err();
        assert!(err.to_string().contains("broken"));
        assert!(format!("{err:#}").contains("site unreachable"));
    }
}
