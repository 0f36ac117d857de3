//! Output sinks for emitted aggregates.
//!
//! This module handles persisting the summarized prefixes:
//! - [`write_aggregates`] - line-oriented aggregate file
//! - [`PrefixStore`] - SQLite table of emitted aggregates

mod file;
mod store;

pub use file::write_aggregates;
pub use store::PrefixStore;
