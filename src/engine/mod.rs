//! Core aggregation engine.
//!
//! Similarity scoring, cross-source matching, and the sequential pipeline
//! that ties sources to the report layer.

pub mod matcher;
pub mod pipeline;
pub mod similarity;
