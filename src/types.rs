//! Shared types for the aggregator.
//!
//! These types form the data model used across all modules.
//! Sources produce [`SourceBatch`]es, the matcher turns the flattened
//! [`RawRecord`]s into [`UnifiedEntity`] groups, and the report layer
//! reads those groups without mutating them.
//!
//! The built-in sources construct batches directly. [`SourceBatch::from_json`]
//! is the entry point for batches arriving as external JSON payloads; it is
//! the only producer of [`AggregatorError::MalformedRecord`].

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Source-side records
// ---------------------------------------------------------------------------

/// A single listing as reported by one source, before the source tag is
/// attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductListing {
    pub name: String,
    /// Free-text classification ("Politics", "Sports", ...). Not used by matching.
    pub category: String,
    /// Probability-style price, usually 0.0–1.0. Not validated.
    pub price: f64,
    pub url: String,
}

/// Everything one source returned in a single fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceBatch {
    /// Source identifier: "polymarket" | "kalshi" | "predictit" | ...
    pub source: String,
    pub products: Vec<ProductListing>,
}

impl SourceBatch {
    pub fn new(source: impl Into<String>, products: Vec<ProductListing>) -> Self {
        Self {
            source: source.into(),
            products,
        }
    }

    /// Parse a batch from an external JSON payload.
    ///
    /// Every listing field is required; a payload missing one fails the whole
    /// batch rather than being skipped.
    pub fn from_json(payload: &str) -> Result<Self, AggregatorError> {
        serde_json::from_str(payload).map_err(|e| AggregatorError::MalformedRecord(e.to_string()))
    }
}

/// One observation from one source, tagged with the source it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub name: String,
    pub category: String,
    pub price: f64,
    pub source: String,
    pub url: String,
}

impl RawRecord {
    /// Attach a source tag to a listing.
    pub fn from_listing(source: &str, listing: &ProductListing) -> Self {
        Self {
            name: listing.name.clone(),
            category: listing.category.clone(),
            price: listing.price,
            source: source.to_string(),
            url: listing.url.clone(),
        }
    }
}

impl fmt::Display for RawRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({:.0}¢ | {})",
            self.source,
            self.name,
            self.price * 100.0,
            self.category,
        )
    }
}

// ---------------------------------------------------------------------------
// Matched output
// ---------------------------------------------------------------------------

/// Confidence assigned to the record that founds a new entity.
pub const FOUNDER_CONFIDENCE: f64 = 1.0;

/// A single source's contribution to a unified entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEntry {
    pub name: String,
    pub source: String,
    pub price: f64,
    /// Similarity (0.0–1.0) against the stored entry this record matched.
    pub confidence: f64,
}

impl MatchEntry {
    pub fn from_record(record: &RawRecord, confidence: f64) -> Self {
        Self {
            name: record.name.clone(),
            source: record.source.clone(),
            price: record.price,
            confidence,
        }
    }
}

/// A group of entries believed to refer to the same real-world item.
///
/// The canonical name is fixed at creation; entries are only ever appended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnifiedEntity {
    name: String,
    matches: Vec<MatchEntry>,
}

impl UnifiedEntity {
    /// Start a new entity from the record that did not match anything.
    pub fn found(record: &RawRecord) -> Self {
        Self {
            name: record.name.clone(),
            matches: vec![MatchEntry::from_record(record, FOUNDER_CONFIDENCE)],
        }
    }

    /// Canonical name: the name of the founding record.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entries in the order they were matched.
    pub fn matches(&self) -> &[MatchEntry] {
        &self.matches
    }

    /// The entry that established this entity.
    pub fn founder(&self) -> &MatchEntry {
        // Constructed with one entry and never shrinks.
        &self.matches[0]
    }

    pub(crate) fn push_match(&mut self, entry: MatchEntry) {
        self.matches.push(entry);
    }

    /// Distinct sources contributing to this entity, in first-seen order.
    pub fn sources(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for m in &self.matches {
            if !seen.contains(&m.source.as_str()) {
                seen.push(&m.source);
            }
        }
        seen
    }

    /// Difference between the highest and lowest price across entries.
    pub fn price_spread(&self) -> f64 {
        let (lo, hi) = self
            .matches
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), m| {
                (lo.min(m.price), hi.max(m.price))
            });
        hi - lo
    }
}

impl fmt::Display for UnifiedEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} matches across {})",
            self.name,
            self.matches.len(),
            self.sources().join(", "),
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for the aggregation pipeline.
#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    #[error("Malformed record: {0}")]
    MalformedRecord(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, source: &str, price: f64) -> RawRecord {
        RawRecord {
            name: name.to_string(),
            category: "Politics".to_string(),
            price,
            source: source.to_string(),
            url: format!("https://{source}.example.com/1"),
        }
    }

    #[test]
    fn test_from_listing_attaches_source() {
        let listing = ProductListing {
            name: "Fed Rate Cut March".into(),
            category: "Economics".into(),
            price: 0.62,
            url: "https://kalshi.com/market/1".into(),
        };
        let r = RawRecord::from_listing("kalshi", &listing);
        assert_eq!(r.source, "kalshi");
        assert_eq!(r.name, "Fed Rate Cut March");
        assert_eq!(r.category, "Economics");
        assert_eq!(r.url, "https://kalshi.com/market/1");
        assert!((r.price - 0.62).abs() < 1e-12);
    }

    #[test]
    fn test_found_entity_has_founder_confidence() {
        let e = UnifiedEntity::found(&record("A", "polymarket", 0.4));
        assert_eq!(e.name(), "A");
        assert_eq!(e.matches().len(), 1);
        assert_eq!(e.founder().confidence, FOUNDER_CONFIDENCE);
        assert_eq!(e.founder().source, "polymarket");
    }

    #[test]
    fn test_push_match_keeps_canonical_name() {
        let mut e = UnifiedEntity::found(&record("Original", "polymarket", 0.4));
        e.push_match(MatchEntry::from_record(&record("Variant", "kalshi", 0.5), 0.9));
        assert_eq!(e.name(), "Original");
        assert_eq!(e.matches()[1].name, "Variant");
    }

    #[test]
    fn test_sources_first_seen_order() {
        let mut e = UnifiedEntity::found(&record("A", "kalshi", 0.4));
        e.push_match(MatchEntry::from_record(&record("A", "polymarket", 0.5), 1.0));
        e.push_match(MatchEntry::from_record(&record("A", "kalshi", 0.45), 1.0));
        assert_eq!(e.sources(), vec!["kalshi", "polymarket"]);
    }

    #[test]
    fn test_price_spread() {
        let mut e = UnifiedEntity::found(&record("A", "polymarket", 0.45));
        e.push_match(MatchEntry::from_record(&record("A", "kalshi", 0.47), 1.0));
        e.push_match(MatchEntry::from_record(&record("A", "predictit", 0.44), 1.0));
        assert!((e.price_spread() - 0.03).abs() < 1e-9);
    }

    #[test]
    fn test_batch_from_json_missing_field_fails() {
        let payload = r#"{"source":"kalshi","products":[{"name":"X","category":"Politics","url":"u"}]}"#;
        let err = SourceBatch::from_json(payload).unwrap_err();
        assert!(matches!(err, AggregatorError::MalformedRecord(_)));
        assert!(err.to_string().contains("price"));
    }

    #[test]
    fn test_batch_from_json_one_bad_listing_fails_batch() {
        let payload = r#"{"source":"kalshi","products":[
            {"name":"X","category":"Politics","price":0.5,"url":"u"},
            {"name":"Y","category":"Politics","price":"high","url":"u"}
        ]}"#;
        let err = SourceBatch::from_json(payload).unwrap_err();
        assert!(matches!(err, AggregatorError::MalformedRecord(_)));
    }

    #[test]
    fn test_batch_from_json_ok() {
        let payload = r#"{"source":"kalshi","products":[{"name":"X","category":"Politics","price":0.5,"url":"u"}]}"#;
        let batch = SourceBatch::from_json(payload).unwrap();
        assert_eq!(batch.source, "kalshi");
        assert_eq!(batch.products.len(), 1);
    }

    #[test]
    fn test_record_display() {
        let r = record("US Presidential Election 2028", "kalshi", 0.47);
        let s = format!("{r}");
        assert!(s.contains("[kalshi]"));
        assert!(s.contains("47¢"));
    }

    #[test]
    fn test_error_display() {
        let e = AggregatorError::MalformedRecord("missing field `price`".into());
        assert_eq!(e.to_string(), "Malformed record: missing field `price`");
    }
}
