//! Dashboard API route handlers.
//!
//! All endpoints return JSON except the CSV export. State is shared via
//! `Arc<DashboardState>`; the latest run is swapped in whole on refresh.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};
use uuid::Uuid;

use crate::engine::pipeline::{Pipeline, PipelineRun};
use crate::export::DOWNLOAD_FILENAME;
use crate::report::{ChartData, KeyStats, Table};
use crate::types::UnifiedEntity;

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct DashboardState {
    pub title: String,
    pub pipeline: Pipeline,
    pub latest: RwLock<PipelineRun>,
}

impl DashboardState {
    pub fn new(title: impl Into<String>, pipeline: Pipeline, initial: PipelineRun) -> Self {
        Self {
            title: title.into(),
            pipeline,
            latest: RwLock::new(initial),
        }
    }
}

pub type AppState = Arc<DashboardState>;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct SummaryResponse {
    pub title: String,
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub records_collected: usize,
    pub stats: KeyStats,
    pub sources: Vec<String>,
}

impl SummaryResponse {
    fn from_run(title: &str, run: &PipelineRun) -> Self {
        Self {
            title: title.to_string(),
            run_id: run.run_id,
            started_at: run.started_at,
            finished_at: run.finished_at,
            records_collected: run.records_collected,
            stats: run.stats,
            sources: run.table.sources.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TableQuery {
    /// Comma-separated source filter, e.g. `kalshi,predictit`.
    pub sources: Option<String>,
}

impl TableQuery {
    fn selected(&self) -> Option<Vec<String>> {
        let raw = self.sources.as_deref()?;
        let selected: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        Some(selected)
    }
}

/// Table flattened into header + row cells for direct rendering.
#[derive(Debug, Clone, Serialize)]
pub struct TableResponse {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl TableResponse {
    fn from_table(table: &Table) -> Self {
        let rows = table
            .rows
            .iter()
            .map(|row| {
                let mut cells = vec![serde_json::Value::from(row.product.clone())];
                for q in &row.quotes {
                    match q {
                        Some(q) => {
                            cells.push(serde_json::Value::from(q.price));
                            cells.push(serde_json::Value::from(q.confidence));
                        }
                        None => {
                            cells.push(serde_json::Value::Null);
                            cells.push(serde_json::Value::Null);
                        }
                    }
                }
                cells
            })
            .collect();

        Self {
            columns: table.columns(),
            rows,
        }
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/summary
pub async fn get_summary(State(state): State<AppState>) -> Json<SummaryResponse> {
    let run = state.latest.read().await;
    Json(SummaryResponse::from_run(&state.title, &run))
}

/// GET /api/entities
pub async fn get_entities(State(state): State<AppState>) -> Json<Vec<UnifiedEntity>> {
    let run = state.latest.read().await;
    Json(run.entities.clone())
}

/// GET /api/table?sources=a,b
pub async fn get_table(
    State(state): State<AppState>,
    Query(query): Query<TableQuery>,
) -> Json<TableResponse> {
    let run = state.latest.read().await;
    let resp = match query.selected() {
        Some(selected) => TableResponse::from_table(&run.table.filter_sources(selected.as_slice())),
        None => TableResponse::from_table(&run.table),
    };
    Json(resp)
}

/// GET /api/charts
pub async fn get_charts(State(state): State<AppState>) -> Json<ChartData> {
    let run = state.latest.read().await;
    Json(run.charts.clone())
}

/// GET /api/export.csv
pub async fn export_csv(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let run = state.latest.read().await;
    let body = run.table.to_csv().map_err(|e| {
        error!(error = %e, "CSV export failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{DOWNLOAD_FILENAME}\""),
            ),
        ],
        body,
    ))
}

/// POST /api/run — run the full pipeline again and publish the result.
pub async fn run_pipeline(
    State(state): State<AppState>,
) -> Result<Json<SummaryResponse>, (StatusCode, String)> {
    let run = state.pipeline.run().await.map_err(|e| {
        error!(error = %e, "Pipeline run from dashboard failed");
        (StatusCode::BAD_GATEWAY, format!("{e:#}"))
    })?;

    info!(run_id = %run.run_id, "Dashboard snapshot refreshed");
    let summary = SummaryResponse::from_run(&state.title, &run);
    *state.latest.write().await = run;
    Ok(Json(summary))
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
