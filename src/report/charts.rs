//! Chart series derived from the table.
//!
//! The dashboard draws grouped bars and a line per source from
//! [`price_series`], and a share-of-average pie from [`average_by_source`].

use serde::Serialize;

use super::table::Table;

/// One (product, source, price) point of the melted price table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    pub product: String,
    pub source: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceAverage {
    pub source: String,
    pub average_price: f64,
    /// Number of priced cells that went into the average.
    pub samples: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub prices: Vec<PricePoint>,
    pub averages: Vec<SourceAverage>,
}

impl ChartData {
    pub fn from_table(table: &Table) -> Self {
        Self {
            prices: price_series(table),
            averages: average_by_source(table),
        }
    }
}

/// Melt the price columns into long form, grouped by source then product.
///
/// Empty cells produce no point.
pub fn price_series(table: &Table) -> Vec<PricePoint> {
    let mut points = Vec::new();
    for (idx, source) in table.sources.iter().enumerate() {
        for row in &table.rows {
            if let Some(q) = row.quote(idx) {
                points.push(PricePoint {
                    product: row.product.clone(),
                    source: source.clone(),
                    price: q.price,
                });
            }
        }
    }
    points
}

/// Mean price per source over its non-empty cells, in table source order.
///
/// Sources with no priced cell are omitted.
pub fn average_by_source(table: &Table) -> Vec<SourceAverage> {
    table
        .sources
        .iter()
        .enumerate()
        .filter_map(|(idx, source)| {
            let prices: Vec<f64> = table
                .rows
                .iter()
                .filter_map(|r| r.quote(idx).map(|q| q.price))
                .collect();
            if prices.is_empty() {
                return None;
            }
            Some(SourceAverage {
                source: source.clone(),
                average_price: prices.iter().sum::<f64>() / prices.len() as f64,
                samples: prices.len(),
            })
        })
        .collect()
}
