//! BGP routing table input.
//!
//! This module feeds the pipeline from router output:
//! - [`read_table_prefixes`] - prefixes one origin AS announces in a dump

mod table;

// Re-export public functions
pub use table::{extract_prefix, read_table_prefixes};
