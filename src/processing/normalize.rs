//! Batch normalization ahead of the contiguity scan.
//!
//! Parses raw CIDR strings, enforces the single-family rule, range-checks the
//! length parameters, drops prefixes longer than `max_length` and sorts what
//! remains by `(network address, prefix length)`. The scan downstream relies
//! on exactly this order.

use crate::error::{AggregateError, AggregateResult};
use crate::models::Prefix;

/// A malformed entry skipped by [`parse_prefixes_lenient`].
#[derive(Debug)]
pub struct SkippedPrefix {
    /// The raw input entry.
    pub input: String,
    /// Why it was rejected.
    pub error: AggregateError,
}

/// Parse a batch of CIDR strings, failing on the first malformed entry.
pub fn parse_prefixes<I, S>(prefixes: I) -> AggregateResult<Vec<Prefix>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    prefixes
        .into_iter()
        .map(|entry| Prefix::new(entry.as_ref()))
        .collect()
}

/// Parse a batch of CIDR strings, collecting malformed entries instead of
/// failing. Each skipped entry is returned with its parse error so the caller
/// can report them.
pub fn parse_prefixes_lenient<I, S>(prefixes: I) -> (Vec<Prefix>, Vec<SkippedPrefix>)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parsed = Vec::new();
    let mut skipped = Vec::new();
    for entry in prefixes {
        let entry = entry.as_ref();
        match Prefix::new(entry) {
            Ok(prefix) => parsed.push(prefix),
            Err(error) => skipped.push(SkippedPrefix {
                input: entry.to_string(),
                error,
            }),
        }
    }
    (parsed, skipped)
}

/// Validate, filter and sort a prefix batch.
///
/// The batch must be a single family. `max_length` defaults to the family
/// width and prefixes longer than it are dropped before sorting; `truncate`
/// is only range-checked here, the contiguity scan applies it. An empty batch
/// is returned as-is since it has no family to check against.
pub fn sorted_prefixes(
    mut prefixes: Vec<Prefix>,
    max_length: Option<u8>,
    truncate: Option<u8>,
) -> AggregateResult<Vec<Prefix>> {
    let Some(first) = prefixes.first() else {
        return Ok(prefixes);
    };
    let family = first.family();

    if let Some(other) = prefixes.iter().find(|p| p.family() != family) {
        return Err(AggregateError::FamilyMismatch {
            first: family,
            second: other.family(),
        });
    }

    let width = family.max_length();
    let max_length = max_length.unwrap_or(width);
    if max_length > width {
        return Err(AggregateError::Range {
            param: "max_length",
            value: max_length,
            family,
            max: width,
        });
    }
    if let Some(truncate) = truncate {
        if truncate > width {
            return Err(AggregateError::Range {
                param: "truncate_length",
                value: truncate,
                family,
                max: width,
            });
        }
    }

    prefixes.retain(|prefix| prefix.prefix_len() <= max_length);
    prefixes.sort_by_key(|prefix| (prefix.lo(), prefix.prefix_len()));
    Ok(prefixes)
}
