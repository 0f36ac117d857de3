//! Contiguity scanning.
//!
//! Partitions a sorted batch into maximal runs of continuous address
//! coverage. A run grows while each candidate is either already covered by
//! the last accepted member or starts exactly one address past it; the first
//! gap ends the run. Truncation, when configured, is applied to each prefix
//! as the scan reaches it, so run members never exceed the truncate length.

use crate::models::Prefix;
use crate::processing::trace::{TraceEvent, TraceSink};

/// Re-derive one prefix at the configured truncate length, if it is longer.
fn apply_truncate(prefix: Prefix, truncate: Option<u8>, trace: &dyn TraceSink) -> Prefix {
    match truncate {
        Some(len) if prefix.prefix_len() > len => {
            let truncated = prefix.truncate(len);
            trace.event(TraceEvent::Truncated {
                original: prefix,
                truncated,
            });
            truncated
        }
        _ => prefix,
    }
}

/// Scan the maximal contiguous run starting at `start`.
///
/// Returns the run members (truncated where configured) and the index of the
/// first prefix past the run. Sorting guarantees a candidate never starts
/// below the run, so covered and adjacent are the only two ways it can
/// continue it.
pub(crate) fn next_run(
    prefixes: &[Prefix],
    start: usize,
    truncate: Option<u8>,
    trace: &dyn TraceSink,
) -> (Vec<Prefix>, usize) {
    let first = apply_truncate(prefixes[start], truncate, trace);
    trace.event(TraceEvent::RunStart { first });

    let mut run = vec![first];
    let mut last = first;
    let mut next = start + 1;
    while next < prefixes.len() {
        let candidate = apply_truncate(prefixes[next], truncate, trace);
        if candidate.hi() <= last.hi() {
            trace.event(TraceEvent::Absorbed {
                prefix: candidate,
                last,
            });
            next += 1;
            continue;
        }
        // checked_add keeps the all-ones broadcast of a full address space
        // from wrapping; no candidate can follow it anyway.
        if last.hi().checked_add(1) == Some(candidate.lo()) {
            trace.event(TraceEvent::Extended { prefix: candidate });
            run.push(candidate);
            last = candidate;
            next += 1;
            continue;
        }
        break;
    }

    trace.event(TraceEvent::RunEnd {
        first,
        last,
        members: run.len(),
    });
    (run, next)
}

/// Partition a sorted batch into its maximal contiguous runs.
///
/// Eager companion to the lazy [`Aggregates`] iterator, useful when the runs
/// themselves are of interest.
///
/// [`Aggregates`]: crate::processing::Aggregates
pub fn contiguous_runs(
    prefixes: &[Prefix],
    truncate: Option<u8>,
    trace: &dyn TraceSink,
) -> Vec<Vec<Prefix>> {
    let mut runs = Vec::new();
    let mut start = 0;
    while start < prefixes.len() {
        let (run, next) = next_run(prefixes, start, truncate, trace);
        runs.push(run);
        start = next;
    }
    runs
}
