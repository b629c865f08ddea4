//! Shared test utilities for core module tests
//!
//! Provides rule builders and a sample snapshot to avoid duplication across
//! test suites. This module is only compiled in test mode.

use crate::core::inventory::Inventory;
use crate::core::ports::PortFields;
use crate::core::rule::{Direction, RawRule, Rule, normalize};

/// Builds and normalizes a rule, panicking on invalid input.
pub fn make_rule(
    direction: Direction,
    protocol: &str,
    ports: Option<(u16, u16)>,
    source: &str,
    destination: &str,
) -> Rule {
    let ports = ports.map_or_else(PortFields::any, |(from, to)| PortFields::range(from, to));
    normalize(
        &RawRule::new(direction)
            .protocol(protocol)
            .ports(ports)
            .source(source)
            .destination(destination),
    )
    .expect("test rule should normalize")
}

/// Snapshot with one VCN, two subnets and three security lists.
///
/// - `app` subnet: `app-sl` has a TCP/80 rule from 10.0.0.0/24 that the
///   `shared-sl` any-protocol rule from 10.0.0.0/16 covers, plus an exact
///   duplicate egress rule.
/// - `db` subnet: only `db-sl`, nothing redundant.
pub fn sample_inventory() -> Inventory {
    Inventory::from_json(SAMPLE_INVENTORY).expect("sample inventory should parse")
}

pub const SAMPLE_INVENTORY: &str = r#"{
  "vcns": [{ "id": "ocid1.vcn.1", "displayName": "prod" }],
  "subnets": [
    {
      "id": "ocid1.subnet.app",
      "displayName": "app",
      "cidrBlock": "10.0.1.0/24",
      "vcnId": "ocid1.vcn.1",
      "securityListIds": ["ocid1.sl.app", "ocid1.sl.shared"]
    },
    {
      "id": "ocid1.subnet.db",
      "displayName": "db",
      "cidrBlock": "10.0.2.0/24",
      "vcnId": "ocid1.vcn.1",
      "securityListIds": ["ocid1.sl.db"]
    }
  ],
  "securityLists": [
    {
      "id": "ocid1.sl.app",
      "displayName": "app-sl",
      "vcnId": "ocid1.vcn.1",
      "ingressSecurityRules": [
        {
          "protocol": "6",
          "source": "10.0.0.0/24",
          "description": "http from lb",
          "tcpOptions": { "destinationPortRange": { "min": 80, "max": 80 } }
        }
      ],
      "egressSecurityRules": [
        { "protocol": "all", "destination": "0.0.0.0/0" },
        { "protocol": "-1", "destination": "0.0.0.0/0" }
      ]
    },
    {
      "id": "ocid1.sl.shared",
      "displayName": "shared-sl",
      "vcnId": "ocid1.vcn.1",
      "ingressSecurityRules": [
        { "protocol": "all", "source": "10.0.0.0/16", "description": "vcn internal" }
      ],
      "egressSecurityRules": []
    },
    {
      "id": "ocid1.sl.db",
      "displayName": "db-sl",
      "vcnId": "ocid1.vcn.1",
      "ingressSecurityRules": [
        {
          "protocol": "6",
          "source": "10.0.1.0/24",
          "description": "postgres from app",
          "tcpOptions": { "destinationPortRange": { "min": 5432, "max": 5432 } }
        },
        { "protocol": "1", "source": "0.0.0.0/0", "icmpOptions": { "type": 3, "code": 4 } }
      ],
      "egressSecurityRules": []
    }
  ],
  "routeTables": [
    {
      "id": "ocid1.rt.1",
      "displayName": "default-rt",
      "vcnId": "ocid1.vcn.1",
      "routeRules": [
        { "destination": "0.0.0.0/0", "description": "internet", "networkEntityId": "ocid1.igw.1" },
        { "destination": "192.168.0.0/16", "description": "on-prem", "networkEntityId": "ocid1.drg.1" }
      ]
    }
  ]
}"#;
