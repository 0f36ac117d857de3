//! Domain models for prefix summarization.
//!
//! This module contains the core data structures used throughout the crate:
//! - [`Prefix`] - CIDR prefix of either family, masked to its network boundary
//! - [`Family`] - IPv4/IPv6 address family and widths

mod prefix;

// Re-export public types
pub use prefix::{Family, Prefix};
