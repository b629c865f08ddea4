//! IPv4 address ranges
//!
//! Rules reference addresses as CIDR blocks (`10.0.0.0/16`), bare hosts
//! (`10.0.0.7`) or not at all (any address). Containment checks work on the
//! inclusive integer interval each expression denotes.

use crate::core::error::{Error, Result};
use ipnetwork::Ipv4Network;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

/// Expression used when a rule does not name an address
pub const ANY_ADDRESS: &str = "0.0.0.0/0";

/// Inclusive interval of IPv4 addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddressRange {
    pub start: u32,
    pub end: u32,
}

impl AddressRange {
    /// The whole IPv4 address space
    pub const FULL: AddressRange = AddressRange {
        start: 0,
        end: u32::MAX,
    };

    pub fn single(addr: Ipv4Addr) -> Self {
        let value = u32::from(addr);
        Self {
            start: value,
            end: value,
        }
    }

    /// Returns true if every address of `other` lies inside `self`.
    pub fn contains(&self, other: &AddressRange) -> bool {
        self.start <= other.start && self.end >= other.end
    }

    /// Number of addresses in the range
    pub fn size(&self) -> u64 {
        u64::from(self.end) - u64::from(self.start) + 1
    }

    pub fn is_full(&self) -> bool {
        *self == Self::FULL
    }
}

impl From<Ipv4Network> for AddressRange {
    fn from(net: Ipv4Network) -> Self {
        Self {
            start: u32::from(net.network()),
            end: u32::from(net.broadcast()),
        }
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            Ipv4Addr::from(self.start),
            Ipv4Addr::from(self.end)
        )
    }
}

/// Parses an address-prefix expression into the range it covers.
///
/// Absent or empty input is the full address space, a bare address is a
/// one-point range, and `address/prefix` is the prefix-aligned block that
/// contains `address`.
///
/// # Errors
///
/// Returns [`Error::Parse`] for a malformed address, an octet above 255, or a
/// prefix length that is not an integer in `0..=32`.
pub fn parse_range(expr: Option<&str>) -> Result<AddressRange> {
    let expr = match expr.map(str::trim) {
        None | Some("") => return Ok(AddressRange::FULL),
        Some(e) => e,
    };

    let Some((addr, prefix)) = expr.split_once('/') else {
        return parse_ipv4(expr).map(AddressRange::single);
    };

    let addr = parse_ipv4(addr).map_err(|e| reword(e, expr))?;
    let prefix: u32 = prefix
        .trim()
        .parse()
        .map_err(|_| Error::parse(expr, format!("prefix length '{prefix}' is not a number")))?;
    let prefix = u8::try_from(prefix)
        .ok()
        .filter(|p| *p <= 32)
        .ok_or_else(|| {
            Error::parse(
                expr,
                format!("prefix length {prefix} must be between 0 and 32"),
            )
        })?;

    let net = Ipv4Network::new(addr, prefix).map_err(|e| Error::parse(expr, e.to_string()))?;
    Ok(AddressRange::from(net))
}

fn reword(err: Error, expr: &str) -> Error {
    match err {
        Error::Parse { message, .. } => Error::parse(expr, message),
        other => other,
    }
}

/// Parses a dotted quad, reporting which octet is wrong.
fn parse_ipv4(input: &str) -> Result<Ipv4Addr> {
    let parts: Vec<&str> = input.trim().split('.').collect();
    if parts.len() != 4 {
        return Err(Error::parse(input, "expected an address of four octets"));
    }

    let mut octets = [0u8; 4];
    for (slot, part) in octets.iter_mut().zip(&parts) {
        let value: u32 = part
            .parse()
            .map_err(|_| Error::parse(input, format!("octet '{part}' is not a number")))?;
        *slot = u8::try_from(value).map_err(|_| {
            Error::parse(input, format!("octet {value} must be between 0 and 255"))
        })?;
    }
    Ok(Ipv4Addr::from(octets))
}

/// Checks strict `a.b.c.d/p` notation with in-range octets and prefix.
pub fn is_valid_cidr(cidr: &str) -> bool {
    let Some((addr, prefix)) = cidr.split_once('/') else {
        return false;
    };

    let digits = |s: &str, max_len: usize| {
        !s.is_empty() && s.len() <= max_len && s.bytes().all(|b| b.is_ascii_digit())
    };

    let octets: Vec<&str> = addr.split('.').collect();
    if octets.len() != 4 || !octets.iter().all(|o| digits(o, 3)) || !digits(prefix, 2) {
        return false;
    }

    octets.iter().all(|o| o.parse::<u16>().is_ok_and(|v| v <= 255))
        && prefix.parse::<u8>().is_ok_and(|p| p <= 32)
}

/// Controls whether the full address space takes part in membership queries.
///
/// `0.0.0.0/0` contains every address, so a search for rules mentioning an IP
/// would otherwise match every "any" rule. By default it is excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MembershipPolicy {
    pub include_full_range: bool,
}

impl MembershipPolicy {
    pub const fn including_full_range() -> Self {
        Self {
            include_full_range: true,
        }
    }
}

/// Returns true if `ip` falls inside `cidr`.
///
/// Invalid CIDR notation never matches. `0.0.0.0/0` only matches when the
/// policy includes the full range.
pub fn ip_in_cidr(ip: Ipv4Addr, cidr: &str, policy: MembershipPolicy) -> bool {
    if !is_valid_cidr(cidr) {
        return false;
    }
    if !policy.include_full_range && cidr == ANY_ADDRESS {
        return false;
    }
    cidr.parse::<Ipv4Network>().is_ok_and(|net| net.contains(ip))
}

/// Network, broadcast and usable host bounds of a CIDR block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CidrBounds {
    pub network: Ipv4Addr,
    pub broadcast: Ipv4Addr,
    pub first_host: Ipv4Addr,
    pub last_host: Ipv4Addr,
    pub size: u64,
}

/// Computes the bounds of a valid CIDR block, `None` otherwise.
///
/// Blocks with more than two addresses reserve the network and broadcast
/// addresses, so the usable hosts start one above and end one below.
pub fn cidr_bounds(cidr: &str) -> Option<CidrBounds> {
    if !is_valid_cidr(cidr) {
        return None;
    }
    let net: Ipv4Network = cidr.parse().ok()?;
    let range = AddressRange::from(net);
    let size = range.size();

    let (first, last) = if size > 2 {
        (range.start + 1, range.end - 1)
    } else {
        (range.start, range.end)
    };

    Some(CidrBounds {
        network: net.network(),
        broadcast: net.broadcast(),
        first_host: Ipv4Addr::from(first),
        last_host: Ipv4Addr::from(last),
        size,
    })
}
