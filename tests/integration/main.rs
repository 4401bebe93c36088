//! Integration tests: full pipeline runs against in-memory sources.

mod mock_source;
mod pipeline;
