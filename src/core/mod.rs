//! Rule normalization and redundancy detection
//!
//! - [`protocol`]: protocol token normalization
//! - [`address`]: IPv4 address ranges, CIDR checks and membership queries
//! - [`ports`]: port ranges and port field resolution
//! - [`rule`]: raw rule adapter and canonical [`rule::Rule`]
//! - [`coverage`]: whether one rule subsumes another
//! - [`redundancy`]: redundant rule filter and per-subnet dedupe
//! - [`inventory`]: snapshot model of VCNs, subnets, security lists and route tables
//! - [`error`]: error types

pub mod address;
pub mod coverage;
pub mod error;
pub mod inventory;
pub mod ports;
pub mod protocol;
pub mod redundancy;
pub mod rule;

#[cfg(test)]
pub mod test_helpers;
