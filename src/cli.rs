//! Command-line surface of the summarizer binary.

use clap::Parser;
use std::path::PathBuf;

/// Summarize the prefixes one origin AS announces in a BGP routing table
/// dump into the minimal set of covering CIDR blocks.
#[derive(Debug, Parser)]
#[command(name = "bgp-prefix-summary")]
#[command(version, about)]
pub struct Cli {
    /// Routing table dump to read.
    pub table: PathBuf,

    /// Origin AS number whose prefixes are summarized, e.g. 65001.
    pub origin_as: String,

    /// File the aggregates are written to, one per line.
    #[arg(short, long, default_value = "aggregated.txt")]
    pub output: PathBuf,

    /// Drop prefixes longer than LEN before aggregating
    /// (default: the full width of the address family).
    #[arg(long, value_name = "LEN")]
    pub max_length: Option<u8>,

    /// Re-derive longer prefixes at length LEN before aggregating;
    /// 0 collapses the whole batch into the default route.
    #[arg(long, value_name = "LEN")]
    pub truncate: Option<u8>,

    /// SQLite database to record the aggregates in
    /// (falls back to the SUMMARY_DB environment variable).
    #[arg(long, value_name = "FILE")]
    pub database: Option<PathBuf>,

    /// Skip malformed prefixes with a warning instead of aborting.
    #[arg(long)]
    pub skip_invalid: bool,

    /// Log every aggregation step: runs, truncations, widenings, coverage.
    #[arg(long)]
    pub trace: bool,
}
