//! Key stats and the plain-text review written alongside the CSV.

use serde::Serialize;
use std::fmt::Write as _;

use super::table::Table;
use crate::types::UnifiedEntity;

/// Headline numbers shown at the top of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeyStats {
    pub products_matched: usize,
    pub sources: usize,
    /// Rows × columns of the full table.
    pub data_points: usize,
}

impl KeyStats {
    pub fn from_table(table: &Table) -> Self {
        Self {
            products_matched: table.row_count(),
            sources: table.sources.len(),
            data_points: table.row_count() * table.column_count(),
        }
    }
}

/// Render a short human-readable summary of a run.
pub fn render_review(entities: &[UnifiedEntity], stats: &KeyStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Unified product review");
    let _ = writeln!(out, "======================");
    let _ = writeln!(
        out,
        "{} products matched across {} sources ({} data points).",
        stats.products_matched, stats.sources, stats.data_points
    );

    if entities.is_empty() {
        let _ = writeln!(out, "\nNo products were collected.");
        return out;
    }

    let _ = writeln!(out);
    for entity in entities {
        let sources = entity.sources();
        let _ = writeln!(
            out,
            "- {}: {} listing(s) from {}; price spread {:.2}",
            entity.name(),
            entity.matches().len(),
            sources.join(", "),
            entity.price_spread(),
        );
        for m in entity.matches() {
            let _ = writeln!(
                out,
                "    {:<12} {:>6.2}  (confidence {:.2})",
                m.source, m.price, m.confidence
            );
        }
    }

    let cross_listed = entities.iter().filter(|e| e.sources().len() > 1).count();
    let _ = writeln!(
        out,
        "\n{cross_listed} of {} products are listed on more than one source.",
        entities.len()
    );

    out
}
