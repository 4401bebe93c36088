//! Cross-source product matcher.
//!
//! Flattens per-source batches into tagged [`RawRecord`]s and groups them
//! into [`UnifiedEntity`] values by name similarity.
//!
//! Matching is first-match-wins: each incoming record is compared against
//! every entry already stored (oldest entity first, oldest entry within it
//! first) and joins the entity of the first entry scoring strictly above
//! [`MATCH_THRESHOLD`]. Because every stored entry is a candidate, a record
//! can join an entity through a variant name rather than the canonical one.

use tracing::{debug, info};

use super::similarity::similarity;
use crate::types::{MatchEntry, RawRecord, SourceBatch, UnifiedEntity};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Similarity (0.0–1.0) a name must strictly exceed to join an entity.
pub const MATCH_THRESHOLD: f64 = 0.80;

// ---------------------------------------------------------------------------
// Flattening
// ---------------------------------------------------------------------------

/// Tag every listing with its source, preserving batch then listing order.
pub fn flatten_batches(batches: &[SourceBatch]) -> Vec<RawRecord> {
    batches
        .iter()
        .flat_map(|batch| {
            batch
                .products
                .iter()
                .map(|listing| RawRecord::from_listing(&batch.source, listing))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Find the first stored entry whose name scores above the threshold.
///
/// Returns the index of the owning entity and the score.
fn find_match(record: &RawRecord, entities: &[UnifiedEntity]) -> Option<(usize, f64)> {
    for (idx, entity) in entities.iter().enumerate() {
        for existing in entity.matches() {
            let score = similarity(&record.name, &existing.name);
            if score > MATCH_THRESHOLD {
                return Some((idx, score));
            }
        }
    }
    None
}

/// Group records into unified entities, in input order.
///
/// Every record ends up in exactly one entity. Entities are returned in
/// creation order and never merged.
pub fn match_records(records: &[RawRecord]) -> Vec<UnifiedEntity> {
    let mut entities: Vec<UnifiedEntity> = Vec::new();

    for record in records {
        match find_match(record, &entities) {
            Some((idx, score)) => {
                debug!(
                    name = %record.name,
                    source = %record.source,
                    entity = %entities[idx].name(),
                    confidence = score,
                    "Matched existing entity"
                );
                entities[idx].push_match(MatchEntry::from_record(record, score));
            }
            None => {
                debug!(
                    name = %record.name,
                    source = %record.source,
                    "No match, founding new entity"
                );
                entities.push(UnifiedEntity::found(record));
            }
        }
    }

    info!(
        records = records.len(),
        entities = entities.len(),
        "Matching complete"
    );

    entities
}

/// Flatten and match in one step.
pub fn match_batches(batches: &[SourceBatch]) -> Vec<UnifiedEntity> {
    match_records(&flatten_batches(batches))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
