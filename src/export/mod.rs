//! Output files.
//!
//! Writes the unified table as CSV and the text review into the configured
//! output directory. Nothing is read back; each run overwrites the files.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::OutputConfig;
use crate::engine::pipeline::PipelineRun;
use crate::report::summary::render_review;

/// Filename offered for the dashboard CSV download.
pub const DOWNLOAD_FILENAME: &str = "unified_products.csv";

/// Paths written by [`write_outputs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenOutputs {
    pub csv: PathBuf,
    pub review: PathBuf,
}

/// Write the CSV and review for a run.
pub fn write_outputs(run: &PipelineRun, cfg: &OutputConfig) -> Result<WrittenOutputs> {
    std::fs::create_dir_all(&cfg.dir)
        .with_context(|| format!("Failed to create output directory {}", cfg.dir.display()))?;

    let csv_path = cfg.csv_path();
    let csv = run.table.to_csv()?;
    std::fs::write(&csv_path, &csv)
        .with_context(|| format!("Failed to write CSV to {}", csv_path.display()))?;
    debug!(path = %csv_path.display(), bytes = csv.len(), "CSV written");

    let review_path = cfg.review_path();
    let review = render_review(&run.entities, &run.stats);
    std::fs::write(&review_path, review)
        .with_context(|| format!("Failed to write review to {}", review_path.display()))?;

    info!(
        csv = %csv_path.display(),
        review = %review_path.display(),
        "Outputs written"
    );

    Ok(WrittenOutputs {
        csv: csv_path,
        review: review_path,
    })
}

/// Remove previously written outputs. Missing files are not an error.
pub fn delete_outputs(cfg: &OutputConfig) -> Result<()> {
    for path in [cfg.csv_path(), cfg.review_path()] {
        remove_if_exists(&path)?;
    }
    Ok(())
}

fn remove_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        std::fs::remove_file(path)
            .with_context(|| format!("Failed to delete {}", path.display()))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
