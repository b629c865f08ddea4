//! Port ranges
//!
//! Raw rules carry ports under several field names and as numbers or
//! strings. [`PortFields`] holds the resolved tokens; [`parse_port_range`]
//! turns them into a canonical inclusive [`PortRange`].

use crate::core::error::{Error, Result};
use crate::core::protocol::Protocol;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Field names read for the lower bound, in precedence order
pub const FROM_PORT_ALIASES: [&str; 4] = ["fromPort", "fromport", "from", "port"];

/// Field names read for the upper bound, in precedence order
pub const TO_PORT_ALIASES: [&str; 4] = ["toPort", "toport", "to", "port"];

/// Inclusive port interval, always ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortRange {
    pub from: u16,
    pub to: u16,
}

impl PortRange {
    /// Every port
    pub const FULL: PortRange = PortRange {
        from: 0,
        to: u16::MAX,
    };

    /// Builds a range, swapping the bounds if they are reversed.
    pub fn new(a: u16, b: u16) -> Self {
        Self {
            from: a.min(b),
            to: a.max(b),
        }
    }

    pub fn single(port: u16) -> Self {
        Self {
            from: port,
            to: port,
        }
    }

    /// Returns true if every port of `other` lies inside `self`.
    pub fn contains(&self, other: &PortRange) -> bool {
        self.from <= other.from && self.to >= other.to
    }

    pub fn contains_port(&self, port: u16) -> bool {
        self.from <= port && port <= self.to
    }

    pub fn is_full(&self) -> bool {
        *self == Self::FULL
    }
}

impl Default for PortRange {
    fn default() -> Self {
        Self::FULL
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

/// Port tokens as found on a raw rule, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortFields {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl PortFields {
    /// No port fields at all (any port)
    pub fn any() -> Self {
        Self::default()
    }

    pub fn range(from: u16, to: u16) -> Self {
        Self {
            from: Some(from.to_string()),
            to: Some(to.to_string()),
        }
    }

    pub fn single(port: u16) -> Self {
        Self::range(port, port)
    }

    pub fn is_empty(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Resolves the port aliases of a flat JSON record.
    pub fn from_json(record: &Value) -> Self {
        Self {
            from: first_token(record, &FROM_PORT_ALIASES),
            to: first_token(record, &TO_PORT_ALIASES),
        }
    }

    /// Reads `<options>.destinationPortRange.{min,max}` for TCP or UDP.
    ///
    /// Source port ranges and ICMP type/code are not ports for containment
    /// purposes and are ignored.
    pub fn from_port_options(record: &Value) -> Self {
        ["tcpOptions", "udpOptions"]
            .iter()
            .filter_map(|key| record.get(*key))
            .filter_map(|opts| opts.get("destinationPortRange"))
            .map(|range| Self {
                from: range.get("min").and_then(value_token),
                to: range.get("max").and_then(value_token),
            })
            .find(|fields| !fields.is_empty())
            .unwrap_or_default()
    }
}

/// Returns the first alias holding a non-null value, rendered as a token.
pub(crate) fn first_token(record: &Value, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .filter_map(|key| record.get(*key))
        .find_map(value_token)
}

/// Renders a JSON scalar as a port token; `null` is absent.
pub(crate) fn value_token(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Parses port tokens into a canonical range.
///
/// `all` and `icmp` always yield the full interval. Without any port token
/// the rule matches any port. A lone upper bound starts at 0 and a lone
/// lower bound is a single port.
///
/// # Errors
///
/// Returns [`Error::Parse`] if a token is not an integer in `0..=65535`.
pub fn parse_port_range(fields: &PortFields, protocol: &Protocol) -> Result<PortRange> {
    if protocol.is_portless() {
        return Ok(PortRange::FULL);
    }

    let (from, to) = match (&fields.from, &fields.to) {
        (None, None) => return Ok(PortRange::FULL),
        (Some(f), None) => (parse_port(f)?, parse_port(f)?),
        (None, Some(t)) => (0, parse_port(t)?),
        (Some(f), Some(t)) => (parse_port(f)?, parse_port(t)?),
    };

    Ok(PortRange::new(from, to))
}

fn parse_port(token: &str) -> Result<u16> {
    token
        .trim()
        .parse::<u16>()
        .map_err(|_| Error::parse(token, "port must be an integer between 0 and 65535"))
}
