//! Error types shared across the aggregation pipeline and its collaborators.

use std::io;

use thiserror::Error;

use crate::models::Family;

/// Result alias used throughout the crate.
pub type AggregateResult<T> = Result<T, AggregateError>;

/// Everything that can go wrong while reading, aggregating or writing
/// prefixes.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// An input entry is not a valid `address/length` pair.
    #[error("invalid prefix '{input}': {reason}")]
    Parse { input: String, reason: String },

    /// A batch mixed IPv4 and IPv6 prefixes.
    #[error("family mismatch: batch mixes {first} and {second} prefixes")]
    FamilyMismatch { first: Family, second: Family },

    /// A length parameter is outside `0..=width` for the batch family.
    #[error("{param} {value} is out of range for {family} (maximum {max})")]
    Range {
        param: &'static str,
        value: u8,
        family: Family,
        max: u8,
    },

    /// I/O failure in the table reader or aggregate writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// SQLite failure in the prefix store.
    #[error("database error: {0}")]
    Store(#[from] rusqlite::Error),
}
