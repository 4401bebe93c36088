//! Sequential aggregation pipeline.
//!
//! collect (sources) → flatten + match → build views. Each run produces an
//! immutable [`PipelineRun`] snapshot that the exporter and dashboard read.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use super::matcher::{flatten_batches, match_records};
use crate::config::{PipelineConfig, RuntimeConfig};
use crate::report::{ChartData, KeyStats, Table};
use crate::sources::{self, RecordSource};
use crate::types::UnifiedEntity;

/// Result of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub records_collected: usize,
    pub entities: Vec<UnifiedEntity>,
    pub table: Table,
    pub stats: KeyStats,
    pub charts: ChartData,
}

impl PipelineRun {
    /// Build the presentation views for a set of matched entities.
    pub fn assemble(
        started_at: DateTime<Utc>,
        records_collected: usize,
        entities: Vec<UnifiedEntity>,
    ) -> Self {
        let table = Table::from_entities(&entities);
        let stats = KeyStats::from_table(&table);
        let charts = ChartData::from_table(&table);
        Self {
            run_id: Uuid::new_v4(),
            started_at,
            finished_at: Utc::now(),
            records_collected,
            entities,
            table,
            stats,
            charts,
        }
    }
}

impl fmt::Display for PipelineRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Run {}: records={} products={} sources={} data_points={}",
            self.run_id,
            self.records_collected,
            self.stats.products_matched,
            self.stats.sources,
            self.stats.data_points,
        )
    }
}

/// Supplier → matcher → presenter, run in sequence.
pub struct Pipeline {
    sources: Vec<Box<dyn RecordSource>>,
    simulated_delay: Duration,
}

impl Pipeline {
    pub fn new(sources: Vec<Box<dyn RecordSource>>, cfg: &PipelineConfig) -> Self {
        Self {
            sources,
            simulated_delay: Duration::from_millis(cfg.simulated_delay_ms),
        }
    }

    /// Build a pipeline over the sources enabled in config.
    pub fn from_config(cfg: &RuntimeConfig) -> Self {
        Self::new(
            sources::build_sources(&cfg.app.sources),
            &cfg.app.pipeline,
        )
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Execute one full run. A failing source aborts the run.
    pub async fn run(&self) -> Result<PipelineRun> {
        let started_at = Utc::now();
        info!(sources = ?self.source_names(), "Running pipeline");

        if !self.simulated_delay.is_zero() {
            tokio::time::sleep(self.simulated_delay).await;
        }

        let batches = sources::collect_all(&self.sources).await?;
        let records = flatten_batches(&batches);
        let entities = match_records(&records);
        let run = PipelineRun::assemble(started_at, records.len(), entities);

        info!(
            run_id = %run.run_id,
            records = run.records_collected,
            products = run.stats.products_matched,
            sources = run.stats.sources,
            "Pipeline completed"
        );

        Ok(run)
    }
}
