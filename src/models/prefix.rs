//! CIDR prefix model shared by both address families.
//!
//! Provides the [`Prefix`] struct for representing IPv4 and IPv6 network
//! prefixes, along with the bit arithmetic the aggregation pipeline runs on.
//! Addresses are masked to the network boundary on construction, so a
//! [`Prefix`] never carries host bits.

use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use crate::error::{AggregateError, AggregateResult};

/// Address family of a prefix.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Family {
    V4,
    V6,
}

impl Family {
    /// Address width in bits, which is also the longest valid prefix length.
    pub const fn max_length(self) -> u8 {
        match self {
            Family::V4 => 32,
            Family::V6 => 128,
        }
    }

    /// The family of a standard library address.
    pub fn of(addr: &IpAddr) -> Family {
        match addr {
            IpAddr::V4(_) => Family::V4,
            IpAddr::V6(_) => Family::V6,
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Family::V4 => write!(f, "IPv4"),
            Family::V6 => write!(f, "IPv6"),
        }
    }
}

/// Address bits as an integer. IPv4 occupies the low 32 bits.
fn addr_bits(addr: &IpAddr) -> u128 {
    match addr {
        IpAddr::V4(a) => u32::from(*a) as u128,
        IpAddr::V6(a) => u128::from(*a),
    }
}

/// Integer bits back to an address of the given family.
fn bits_to_addr(family: Family, bits: u128) -> IpAddr {
    match family {
        Family::V4 => IpAddr::V4(Ipv4Addr::from(bits as u32)),
        Family::V6 => IpAddr::V6(Ipv6Addr::from(bits)),
    }
}

/// All address bits set within the family width.
fn all_ones(family: Family) -> u128 {
    match family {
        Family::V4 => u32::MAX as u128,
        Family::V6 => u128::MAX,
    }
}

/// Network mask selecting the `len` leading bits within the family width.
///
/// Length 0 selects no bits; shifting by the full width would overflow.
fn mask_bits(family: Family, len: u8) -> u128 {
    debug_assert!(len <= family.max_length(), "prefix length exceeds width");
    if len == 0 {
        return 0;
    }
    let right_len = (family.max_length() - len) as u32;
    (all_ones(family) >> right_len) << right_len
}

/// A CIDR prefix of either family: a network address plus a prefix length.
///
/// Two prefixes of different families are never equal, and the crate treats
/// them as incomparable; batches that mix families are rejected up front.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Prefix {
    addr: IpAddr,
    len: u8,
}

impl Serialize for Prefix {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        let cidr = format!("{}/{}", self.addr, self.len);
        serializer.serialize_str(&cidr)
    }
}

impl<'de> Deserialize<'de> for Prefix {
    fn deserialize<D>(deserializer: D) -> Result<Prefix, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Prefix::new(&s).map_err(de::Error::custom)
    }
}

impl Prefix {
    /// Create a new [`Prefix`] from a CIDR string (e.g., "10.0.0.0/24" or
    /// "2001:db8::/32"). Host bits beyond the prefix length are masked away,
    /// not rejected.
    ///
    /// # Examples
    /// ```
    /// use bgp_prefix_summary::models::Prefix;
    /// let prefix = Prefix::new("192.0.2.130/25").unwrap();
    /// assert_eq!(prefix.to_string(), "192.0.2.128/25");
    /// ```
    pub fn new(addr_cidr: &str) -> AggregateResult<Prefix> {
        let addr_cidr = addr_cidr.trim();
        let parts: Vec<&str> = addr_cidr.split('/').collect();
        if parts.len() != 2 {
            return Err(AggregateError::Parse {
                input: addr_cidr.to_string(),
                reason: "expected address/length".to_string(),
            });
        }
        let addr: IpAddr = parts[0].parse().map_err(|_| AggregateError::Parse {
            input: addr_cidr.to_string(),
            reason: format!("invalid address '{}'", parts[0]),
        })?;
        let len: u8 = parts[1].parse().map_err(|_| AggregateError::Parse {
            input: addr_cidr.to_string(),
            reason: format!("invalid prefix length '{}'", parts[1]),
        })?;
        Prefix::from_parts(addr, len)
    }

    /// Build a [`Prefix`] from a pre-parsed address and length, masking any
    /// host bits down to the network boundary.
    pub fn from_parts(addr: IpAddr, len: u8) -> AggregateResult<Prefix> {
        let family = Family::of(&addr);
        if len > family.max_length() {
            return Err(AggregateError::Parse {
                input: format!("{}/{}", addr, len),
                reason: format!(
                    "prefix length {} exceeds the {} maximum of {}",
                    len,
                    family,
                    family.max_length()
                ),
            });
        }
        let bits = addr_bits(&addr) & mask_bits(family, len);
        Ok(Prefix {
            addr: bits_to_addr(family, bits),
            len,
        })
    }

    /// Address family of this prefix.
    pub fn family(&self) -> Family {
        Family::of(&self.addr)
    }

    /// Prefix length in bits.
    pub fn prefix_len(&self) -> u8 {
        self.len
    }

    /// Network address, the lowest address of the block.
    pub fn network(&self) -> IpAddr {
        self.addr
    }

    /// Broadcast address, the highest address of the block.
    pub fn broadcast(&self) -> IpAddr {
        bits_to_addr(self.family(), self.hi())
    }

    /// The lowest address of the block as integer bits.
    pub fn lo(&self) -> u128 {
        addr_bits(&self.addr)
    }

    /// The highest address of the block as integer bits.
    pub fn hi(&self) -> u128 {
        let family = self.family();
        self.lo() | (all_ones(family) ^ mask_bits(family, self.len))
    }

    /// Re-derive this prefix at a shorter length, masking the address down to
    /// the wider network boundary.
    ///
    /// # Examples
    /// ```
    /// use bgp_prefix_summary::models::Prefix;
    /// let host = Prefix::new("10.1.2.3/32").unwrap();
    /// assert_eq!(host.truncate(24).to_string(), "10.1.2.0/24");
    /// ```
    pub fn truncate(&self, len: u8) -> Prefix {
        assert!(
            len <= self.len,
            "prefix can only be truncated to a shorter length"
        );
        let family = self.family();
        Prefix {
            addr: bits_to_addr(family, self.lo() & mask_bits(family, len)),
            len,
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.len)
    }
}

impl FromStr for Prefix {
    type Err = AggregateError;

    fn from_str(s: &str) -> AggregateResult<Prefix> {
        Prefix::new(s)
    }
}
