//! Presentation layer.
//!
//! Everything here reads the matcher's output and never changes it:
//! - `table` — one row per entity, price/confidence pair per source, CSV
//! - `charts` — price series and per-source averages
//! - `summary` — key stats and the text review

pub mod charts;
pub mod summary;
pub mod table;

pub use charts::ChartData;
pub use summary::KeyStats;
pub use table::Table;
