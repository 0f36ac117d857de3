// cargo watch -x 'fmt' -x 'test'

//! Summarize CIDR prefixes into the smallest set of non-overlapping,
//! address-aligned blocks that covers exactly the same address space.
//!
//! The pipeline has three pure stages: normalization (parse, validate, sort),
//! contiguity scanning (partition into maximal adjacent runs) and greedy
//! aggregation (minimal covering blocks per run). Results come back as a lazy
//! iterator in increasing network-address order. Around the library sits a
//! binary that feeds the pipeline from BGP routing table dumps and writes the
//! aggregates to a file and, optionally, a SQLite store.
//!
//! ```
//! use bgp_prefix_summary::aggregate_prefixes;
//!
//! let aggregates = aggregate_prefixes(
//!     ["192.0.2.0/25", "192.0.2.128/25", "10.0.0.0/8", "10.0.0.0/16"],
//!     None,
//!     None,
//! )?;
//! let summary: Vec<String> = aggregates.map(|p| p.to_string()).collect();
//! assert_eq!(summary, ["10.0.0.0/8", "192.0.2.0/24"]);
//! # Ok::<(), bgp_prefix_summary::AggregateError>(())
//! ```

pub mod bgp;
pub mod error;
pub mod models;
pub mod output;
pub mod processing;

pub use error::{AggregateError, AggregateResult};
pub use models::{Family, Prefix};
pub use processing::{
    aggregate, aggregate_prefixes, aggregate_with, parse_prefixes, parse_prefixes_lenient,
    Aggregates,
};
