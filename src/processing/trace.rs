//! Structured diagnostics for the aggregation pipeline.
//!
//! The pipeline itself never writes to the console. Every stage decision is
//! reported as a [`TraceEvent`] to an injectable [`TraceSink`]; [`NullTrace`]
//! is the silent default and [`LogTrace`] forwards events to `log::debug!`.

use crate::models::{Family, Prefix};

/// One stage decision made while aggregating a batch.
#[derive(Debug, Copy, Clone)]
pub enum TraceEvent {
    /// The batch was validated, filtered and sorted.
    Normalized { count: usize, family: Family },
    /// A new contiguous run starts at this prefix.
    RunStart { first: Prefix },
    /// A prefix was re-derived at the configured truncate length.
    Truncated { original: Prefix, truncated: Prefix },
    /// The candidate is already covered by the run and was dropped.
    Absorbed { prefix: Prefix, last: Prefix },
    /// The candidate starts right after the run and was appended.
    Extended { prefix: Prefix },
    /// The current run is complete.
    RunEnd {
        first: Prefix,
        last: Prefix,
        members: usize,
    },
    /// A tentative widening of the current anchor, and whether it was kept.
    Tentative { block: Prefix, accepted: bool },
    /// An aggregate was emitted, covering `covered` run members.
    Aggregated { aggregate: Prefix, covered: usize },
}

/// Receiver for [`TraceEvent`]s.
pub trait TraceSink {
    fn event(&self, event: TraceEvent);
}

/// Discards every event.
#[derive(Debug, Default, Copy, Clone)]
pub struct NullTrace;

impl TraceSink for NullTrace {
    fn event(&self, _event: TraceEvent) {}
}

/// Forwards every event to `log::debug!`.
#[derive(Debug, Default, Copy, Clone)]
pub struct LogTrace;

impl TraceSink for LogTrace {
    fn event(&self, event: TraceEvent) {
        match event {
            TraceEvent::Normalized { count, family } => {
                log::debug!("normalized batch: {} {} prefixes", count, family)
            }
            TraceEvent::RunStart { first } => log::debug!("run starts at {}", first),
            TraceEvent::Truncated {
                original,
                truncated,
            } => log::debug!("truncated {} to {}", original, truncated),
            TraceEvent::Absorbed { prefix, last } => {
                log::debug!("absorbed {} (already covered through {})", prefix, last)
            }
            TraceEvent::Extended { prefix } => log::debug!("extended run with {}", prefix),
            TraceEvent::RunEnd {
                first,
                last,
                members,
            } => log::debug!("run ends: {} .. {} ({} members)", first, last, members),
            TraceEvent::Tentative { block, accepted } => {
                let verdict = if accepted { "accepted" } else { "rejected" };
                log::debug!("tentative {} {}", block, verdict)
            }
            TraceEvent::Aggregated { aggregate, covered } => {
                log::debug!("aggregate {} covers {} members", aggregate, covered)
            }
        }
    }
}

/// Shared silent sink for entry points that do not take a caller-supplied one.
pub(crate) static NULL_TRACE: NullTrace = NullTrace;
