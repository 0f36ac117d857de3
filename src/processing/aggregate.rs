//! Greedy aggregation of contiguous runs.
//!
//! Each run is condensed into the smallest set of address-aligned blocks that
//! covers exactly the same space: the first uncovered member is widened to
//! the shortest length that keeps its network address and stays inside the
//! run, then every member the chosen block covers is skipped. The entry
//! points at the bottom wire the whole pipeline behind a lazy iterator.

use std::fmt;

use crate::error::AggregateResult;
use crate::models::Prefix;
use crate::processing::contiguity::next_run;
use crate::processing::normalize::{parse_prefixes, sorted_prefixes};
use crate::processing::trace::{TraceEvent, TraceSink, NULL_TRACE};

/// Widen the run member at `from` into its aggregate block.
///
/// Returns the block and the index of the first member it does not cover.
/// Widening tries one bit at a time and keeps the last length where the
/// anchor still sits on the block boundary and the block still ends inside
/// the run; both checks only get harder as the length shrinks, so the first
/// rejection is final.
pub(crate) fn cover_first(run: &[Prefix], from: usize, trace: &dyn TraceSink) -> (Prefix, usize) {
    let anchor = run[from];
    let run_end = run[run.len() - 1].hi();

    let mut aggregate = anchor;
    let mut len = anchor.prefix_len();
    while len > 0 {
        len -= 1;
        let tentative = anchor.truncate(len);
        let accepted = tentative.lo() == anchor.lo() && tentative.hi() <= run_end;
        trace.event(TraceEvent::Tentative {
            block: tentative,
            accepted,
        });
        if !accepted {
            break;
        }
        aggregate = tentative;
    }

    let mut next = from + 1;
    while next < run.len() && run[next].lo() <= aggregate.hi() {
        next += 1;
    }
    trace.event(TraceEvent::Aggregated {
        aggregate,
        covered: next - from,
    });
    (aggregate, next)
}

/// Condense one contiguous run into its minimal covering blocks.
///
/// The slice must be a single run as produced by the contiguity scan: sorted,
/// gap-free and without covered members.
pub fn aggregate_run(run: &[Prefix], trace: &dyn TraceSink) -> Vec<Prefix> {
    let mut aggregates = Vec::new();
    let mut from = 0;
    while from < run.len() {
        let (aggregate, next) = cover_first(run, from, trace);
        aggregates.push(aggregate);
        from = next;
    }
    aggregates
}

/// Lazy aggregate sequence over a normalized batch.
///
/// Yields aggregates in strictly increasing network-address order. Runs are
/// scanned on demand, one at a time, so dropping the iterator early does no
/// further work.
pub struct Aggregates<'a> {
    prefixes: Vec<Prefix>,
    truncate: Option<u8>,
    trace: &'a dyn TraceSink,
    /// Index into `prefixes` where the next run starts.
    cursor: usize,
    /// Members of the run currently being condensed.
    run: Vec<Prefix>,
    /// Index into `run` of the first member not yet covered.
    covered: usize,
}

impl Iterator for Aggregates<'_> {
    type Item = Prefix;

    fn next(&mut self) -> Option<Prefix> {
        loop {
            if self.covered < self.run.len() {
                let (aggregate, next) = cover_first(&self.run, self.covered, self.trace);
                self.covered = next;
                return Some(aggregate);
            }
            if self.cursor >= self.prefixes.len() {
                return None;
            }
            let (run, next) = next_run(&self.prefixes, self.cursor, self.truncate, self.trace);
            self.run = run;
            self.covered = 0;
            self.cursor = next;
        }
    }
}

impl std::iter::FusedIterator for Aggregates<'_> {}

// The sink is a trait object without a Debug bound, so it is elided.
impl fmt::Debug for Aggregates<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Aggregates")
            .field("prefixes", &self.prefixes)
            .field("truncate", &self.truncate)
            .field("cursor", &self.cursor)
            .field("run", &self.run)
            .field("covered", &self.covered)
            .finish_non_exhaustive()
    }
}

/// Aggregate a batch of CIDR strings into its minimal covering blocks.
///
/// Parsing is strict: the first malformed entry fails the whole batch. Pair
/// `parse_prefixes_lenient` with [`aggregate`] to skip malformed entries
/// instead.
///
/// # Examples
/// ```
/// use bgp_prefix_summary::aggregate_prefixes;
///
/// let aggregates = aggregate_prefixes(["192.0.2.0/25", "192.0.2.128/25"], None, None)?;
/// let summary: Vec<String> = aggregates.map(|p| p.to_string()).collect();
/// assert_eq!(summary, ["192.0.2.0/24"]);
/// # Ok::<(), bgp_prefix_summary::AggregateError>(())
/// ```
pub fn aggregate_prefixes<I, S>(
    prefixes: I,
    max_length: Option<u8>,
    truncate: Option<u8>,
) -> AggregateResult<Aggregates<'static>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    aggregate(parse_prefixes(prefixes)?, max_length, truncate)
}

/// Aggregate a batch of parsed prefixes with diagnostics disabled.
pub fn aggregate(
    prefixes: Vec<Prefix>,
    max_length: Option<u8>,
    truncate: Option<u8>,
) -> AggregateResult<Aggregates<'static>> {
    aggregate_with(prefixes, max_length, truncate, &NULL_TRACE)
}

/// Aggregate a batch of parsed prefixes, reporting every stage decision to
/// `trace`.
pub fn aggregate_with(
    prefixes: Vec<Prefix>,
    max_length: Option<u8>,
    truncate: Option<u8>,
    trace: &dyn TraceSink,
) -> AggregateResult<Aggregates<'_>> {
    let prefixes = sorted_prefixes(prefixes, max_length, truncate)?;
    if let Some(first) = prefixes.first() {
        trace.event(TraceEvent::Normalized {
            count: prefixes.len(),
            family: first.family(),
        });
    }
    Ok(Aggregates {
        prefixes,
        truncate,
        trace,
        cursor: 0,
        run: Vec::new(),
        covered: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AggregateError;
    use crate::processing::trace::NullTrace;
    use std::cell::RefCell;

    fn summarize(input: &[&str], max_length: Option<u8>, truncate: Option<u8>) -> Vec<String> {
        aggregate_prefixes(input.iter().copied(), max_length, truncate)
            .unwrap()
            .map(|p| p.to_string())
            .collect()
    }

    #[test]
    fn test_adjacent_pair_merges() {
        assert_eq!(
            summarize(&["192.0.2.0/25", "192.0.2.128/25"], None, None),
            ["192.0.2.0/24"]
        );
    }

    #[test]
    fn test_covered_prefix_collapses() {
        assert_eq!(
            summarize(&["10.0.0.0/8", "10.0.0.0/16"], None, None),
            ["10.0.0.0/8"]
        );
    }

    #[test]
    fn test_gap_is_preserved() {
        assert_eq!(
            summarize(&["10.0.0.0/24", "10.0.2.0/24"], None, None),
            ["10.0.0.0/24", "10.0.2.0/24"]
        );
    }

    #[test]
    fn test_unaligned_neighbours_stay_apart() {
        // 10.0.1.0 and 10.0.2.0 are adjacent but no single block is aligned
        // on both, so the run needs two aggregates.
        assert_eq!(
            summarize(&["10.0.1.0/24", "10.0.2.0/24"], None, None),
            ["10.0.1.0/24", "10.0.2.0/24"]
        );
    }

    #[test]
    fn test_three_blocks_need_two_aggregates() {
        assert_eq!(
            summarize(&["10.0.0.0/24", "10.0.1.0/24", "10.0.2.0/24"], None, None),
            ["10.0.0.0/23", "10.0.2.0/24"]
        );
    }

    #[test]
    fn test_widening_spans_absorbed_members() {
        // The /25 disappears into the first /24, and the two /24s still merge.
        assert_eq!(
            summarize(&["10.0.0.0/24", "10.0.0.128/25", "10.0.1.0/24"], None, None),
            ["10.0.0.0/23"]
        );
    }

    #[test]
    fn test_truncate_reduces_host_routes() {
        assert_eq!(summarize(&["10.1.2.3/32"], None, Some(24)), ["10.1.2.0/24"]);
    }

    #[test]
    fn test_truncate_zero_yields_default_route() {
        assert_eq!(
            summarize(&["10.0.0.0/24", "192.168.1.0/24"], None, Some(0)),
            ["0.0.0.0/0"]
        );
        assert_eq!(
            summarize(&["2001:db8::/48"], None, Some(0)),
            ["::/0"]
        );
    }

    #[test]
    fn test_max_length_discards_long_prefixes() {
        assert_eq!(
            summarize(&["10.0.0.0/30", "10.0.0.4/31"], Some(30), None),
            ["10.0.0.0/30"]
        );
    }

    #[test]
    fn test_mixed_families_are_rejected() {
        let err = aggregate_prefixes(["10.0.0.0/24", "2001:db8::/32"], None, None).unwrap_err();
        assert!(matches!(err, AggregateError::FamilyMismatch { .. }));
    }

    #[test]
    fn test_empty_batch_yields_nothing() {
        let mut aggregates = aggregate_prefixes::<_, &str>([], None, None).unwrap();
        assert!(aggregates.next().is_none());
        assert!(aggregates.next().is_none());
    }

    #[test]
    fn test_default_route_swallows_the_batch() {
        assert_eq!(
            summarize(&["0.0.0.0/0", "10.0.0.0/8", "192.0.2.0/24"], None, None),
            ["0.0.0.0/0"]
        );
    }

    #[test]
    fn test_v6_pair_merges() {
        assert_eq!(
            summarize(&["2001:db8::/33", "2001:db8:8000::/33"], None, None),
            ["2001:db8::/32"]
        );
    }

    #[test]
    fn test_v6_halves_cover_the_whole_space() {
        // Widening reaches /0 at the very top of the 128-bit space.
        assert_eq!(summarize(&["::/1", "8000::/1"], None, None), ["::/0"]);
    }

    #[test]
    fn test_input_order_does_not_matter() {
        assert_eq!(
            summarize(&["192.0.2.128/25", "192.0.2.0/25"], None, None),
            ["192.0.2.0/24"]
        );
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let once: Vec<Prefix> = aggregate_prefixes(
            ["10.64.0.0/16", "10.65.0.0/16", "10.64.128.0/20", "172.16.40.0/24"],
            None,
            None,
        )
        .unwrap()
        .collect();
        let twice: Vec<Prefix> = aggregate(once.clone(), None, None).unwrap().collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_aggregate_run_handles_the_trivial_cases() {
        assert!(aggregate_run(&[], &NullTrace).is_empty());

        let single = [Prefix::new("172.16.40.0/24").unwrap()];
        assert_eq!(aggregate_run(&single, &NullTrace), single);
    }

    #[test]
    fn test_iterator_scans_runs_on_demand() {
        let trace = RecordingTrace {
            events: RefCell::new(Vec::new()),
        };
        let input = parse_prefixes(["10.0.0.0/24", "10.0.2.0/24", "10.0.4.0/24"]).unwrap();
        let mut aggregates = aggregate_with(input, None, None, &trace).unwrap();

        let runs_started = || {
            trace
                .events
                .borrow()
                .iter()
                .filter(|e| matches!(e, TraceEvent::RunStart { .. }))
                .count()
        };

        // Pulling one aggregate scans exactly one run.
        assert_eq!(aggregates.next().unwrap().to_string(), "10.0.0.0/24");
        assert_eq!(runs_started(), 1);

        assert_eq!(aggregates.count(), 2);
        assert_eq!(runs_started(), 3);
    }

    #[test]
    fn test_aggregates_debug_output_tracks_the_scan() {
        let input = parse_prefixes(["10.0.0.0/24", "10.0.1.0/24"]).unwrap();
        let mut aggregates = aggregate(input, None, None).unwrap();

        let rendered = format!("{:?}", aggregates);
        assert!(rendered.starts_with("Aggregates"));
        assert!(rendered.contains("cursor: 0"));
        // The trace sink is elided from the rendering.
        assert!(rendered.ends_with(".. }"));

        assert_eq!(aggregates.next().unwrap().to_string(), "10.0.0.0/23");
        assert!(format!("{:?}", aggregates).contains("cursor: 2"));
    }

    /// Records every event for assertions on pipeline accounting.
    struct RecordingTrace {
        events: RefCell<Vec<TraceEvent>>,
    }

    impl TraceSink for RecordingTrace {
        fn event(&self, event: TraceEvent) {
            self.events.borrow_mut().push(event);
        }
    }

    #[test]
    fn test_trace_reports_every_stage() {
        let trace = RecordingTrace {
            events: RefCell::new(Vec::new()),
        };
        let input = parse_prefixes([
            "10.0.0.0/24",
            "10.0.0.128/25",
            "10.0.1.0/24",
            "192.0.2.0/24",
        ])
        .unwrap();
        let aggregates: Vec<Prefix> = aggregate_with(input, None, None, &trace)
            .unwrap()
            .collect();
        assert_eq!(aggregates.len(), 2);

        let events = trace.events.borrow();
        let count = |matcher: fn(&TraceEvent) -> bool| events.iter().filter(|e| matcher(e)).count();

        assert_eq!(count(|e| matches!(e, TraceEvent::Normalized { .. })), 1);
        assert_eq!(count(|e| matches!(e, TraceEvent::RunStart { .. })), 2);
        assert_eq!(count(|e| matches!(e, TraceEvent::RunEnd { .. })), 2);
        assert_eq!(count(|e| matches!(e, TraceEvent::Absorbed { .. })), 1);
        assert_eq!(count(|e| matches!(e, TraceEvent::Extended { .. })), 1);
        assert_eq!(
            count(|e| matches!(e, TraceEvent::Aggregated { .. })),
            aggregates.len()
        );
        assert!(count(|e| matches!(e, TraceEvent::Tentative { .. })) > 0);
    }

    #[test]
    fn test_trace_counts_truncations() {
        let trace = RecordingTrace {
            events: RefCell::new(Vec::new()),
        };
        let input = parse_prefixes(["10.1.2.3/32", "10.1.2.9/32", "10.1.3.0/24"]).unwrap();
        let aggregates: Vec<Prefix> = aggregate_with(input, None, Some(24), &trace)
            .unwrap()
            .collect();
        assert_eq!(aggregates.len(), 1);
        assert_eq!(aggregates[0].to_string(), "10.1.2.0/23");

        let events = trace.events.borrow();
        let truncations = events
            .iter()
            .filter(|e| matches!(e, TraceEvent::Truncated { .. }))
            .count();
        // Both host routes get truncated; the /24 is already short enough.
        assert_eq!(truncations, 2);
    }
}
