//! Tabular view over unified entities.
//!
//! One row per entity. After the `Product Name` column, every source seen
//! across all matches gets a `{source} Price` / `{source} Confidence`
//! column pair, in order of first appearance.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::types::UnifiedEntity;

pub const PRODUCT_COLUMN: &str = "Product Name";

/// One source's cell pair within a row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SourceQuote {
    pub price: f64,
    /// Rounded to two decimals.
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub product: String,
    /// Aligned with [`Table::sources`]; `None` when the source has no entry.
    pub quotes: Vec<Option<SourceQuote>>,
}

impl TableRow {
    /// Quote for a source by position in the owning table.
    pub fn quote(&self, idx: usize) -> Option<SourceQuote> {
        self.quotes.get(idx).copied().flatten()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub sources: Vec<String>,
    pub rows: Vec<TableRow>,
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Render a float the way a spreadsheet export would: integral values keep
/// one decimal place.
fn format_number(x: f64) -> String {
    if x.is_finite() && x.fract() == 0.0 {
        format!("{x:.1}")
    } else {
        format!("{x}")
    }
}

impl Table {
    /// Build the table from matched entities.
    ///
    /// When one source contributes several entries to an entity, the last
    /// one fills the cell.
    pub fn from_entities(entities: &[UnifiedEntity]) -> Self {
        let mut sources: Vec<String> = Vec::new();
        for entity in entities {
            for m in entity.matches() {
                if !sources.iter().any(|s| s == &m.source) {
                    sources.push(m.source.clone());
                }
            }
        }

        let rows = entities
            .iter()
            .map(|entity| {
                let mut quotes = vec![None; sources.len()];
                for m in entity.matches() {
                    if let Some(idx) = sources.iter().position(|s| s == &m.source) {
                        quotes[idx] = Some(SourceQuote {
                            price: m.price,
                            confidence: round2(m.confidence),
                        });
                    }
                }
                TableRow {
                    product: entity.name().to_string(),
                    quotes,
                }
            })
            .collect();

        Self { sources, rows }
    }

    /// Header row: product column followed by a price/confidence pair per source.
    pub fn columns(&self) -> Vec<String> {
        let mut cols = Vec::with_capacity(1 + self.sources.len() * 2);
        cols.push(PRODUCT_COLUMN.to_string());
        for s in &self.sources {
            cols.push(format!("{s} Price"));
            cols.push(format!("{s} Confidence"));
        }
        cols
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        1 + self.sources.len() * 2
    }

    /// Keep only the selected sources, in selection order.
    ///
    /// A selected source the table has never seen yields empty cells.
    pub fn filter_sources<S: AsRef<str>>(&self, selected: &[S]) -> Table {
        let mapping: Vec<Option<usize>> = selected
            .iter()
            .map(|s| self.sources.iter().position(|known| known == s.as_ref()))
            .collect();

        let rows = self
            .rows
            .iter()
            .map(|row| TableRow {
                product: row.product.clone(),
                quotes: mapping
                    .iter()
                    .map(|idx| idx.and_then(|i| row.quote(i)))
                    .collect(),
            })
            .collect();

        Table {
            sources: selected.iter().map(|s| s.as_ref().to_string()).collect(),
            rows,
        }
    }

    /// Flatten a row into string cells matching [`Table::columns`].
    fn record(row: &TableRow) -> Vec<String> {
        let mut cells = Vec::with_capacity(1 + row.quotes.len() * 2);
        cells.push(row.product.clone());
        for q in &row.quotes {
            match q {
                Some(q) => {
                    cells.push(format_number(q.price));
                    cells.push(format_number(q.confidence));
                }
                None => {
                    cells.push(String::new());
                    cells.push(String::new());
                }
            }
        }
        cells
    }

    /// Serialise as UTF-8 CSV: header row, then one row per entity.
    pub fn to_csv(&self) -> Result<Vec<u8>> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(self.columns())
            .context("Failed to write CSV header")?;
        for row in &self.rows {
            wtr.write_record(Self::record(row))
                .with_context(|| format!("Failed to write CSV row for {}", row.product))?;
        }
        wtr.into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e.error()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
