//! Prefix aggregation pipeline.
//!
//! Three pure stages with data flowing strictly forward:
//! - [`normalize`] - parsing, family checks, filtering and ordering
//! - [`contiguity`] - partitioning into maximal contiguous runs
//! - [`aggregate`] - greedy widening into minimal covering blocks
//!
//! Diagnostics go through the [`trace`] sink, never straight to the console.

mod aggregate;
mod contiguity;
mod normalize;
pub mod trace;

// Re-export public functions
pub use aggregate::{aggregate, aggregate_prefixes, aggregate_run, aggregate_with, Aggregates};
pub use contiguity::contiguous_runs;
pub use normalize::{parse_prefixes, parse_prefixes_lenient, sorted_prefixes, SkippedPrefix};
pub use trace::{LogTrace, NullTrace, TraceEvent, TraceSink};
