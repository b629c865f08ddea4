//! Protocol normalization
//!
//! Inventories express protocols as IANA numbers (`"6"`, `"17"`, `"-1"` for
//! any) or as names. Both collapse to one canonical [`Protocol`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical protocol of a rule
///
/// Unrecognized tokens are kept verbatim in [`Protocol::Other`] so that two
/// rules with the same exotic protocol still compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Protocol {
    /// Any protocol
    #[default]
    All,
    /// Transmission Control Protocol
    Tcp,
    /// User Datagram Protocol
    Udp,
    /// Internet Control Message Protocol (IPv4)
    Icmp,
    /// Pass-through token, already lowercased
    Other(String),
}

impl Protocol {
    /// Normalizes a protocol token; absent input means `all`.
    pub fn normalize(token: Option<&str>) -> Self {
        let key = token.unwrap_or("all").to_lowercase();
        match key.as_str() {
            "-1" | "all" => Protocol::All,
            "6" | "tcp" => Protocol::Tcp,
            "17" | "udp" => Protocol::Udp,
            "1" | "icmp" => Protocol::Icmp,
            _ => Protocol::Other(key),
        }
    }

    /// Returns the canonical lowercase token
    pub fn as_str(&self) -> &str {
        match self {
            Protocol::All => "all",
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
            Protocol::Icmp => "icmp",
            Protocol::Other(token) => token,
        }
    }

    /// Returns display name for listing output
    pub fn display_name(&self) -> &str {
        match self {
            Protocol::All => "all",
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
            Protocol::Icmp => "ICMP",
            Protocol::Other(token) => token,
        }
    }

    /// Protocols whose rules never restrict ports
    pub fn is_portless(&self) -> bool {
        matches!(self, Protocol::All | Protocol::Icmp)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Protocol {
    fn from(token: String) -> Self {
        Protocol::normalize(Some(&token))
    }
}

impl From<Protocol> for String {
    fn from(protocol: Protocol) -> Self {
        protocol.as_str().to_string()
    }
}
