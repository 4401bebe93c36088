//! AGGREGATOR — Cross-platform prediction market product matcher
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod sources;
pub mod engine;
pub mod report;
pub mod export;
pub mod dashboard;
