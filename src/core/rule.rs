//! Canonical rules and the adapter that produces them
//!
//! Rules arrive in several shapes: flat records with aliased field names
//! (`fromCidr` / `fromip` / `source`, `fromPort` / `from` / `port`, ...) or
//! cloud security-list entries with nested port options. Every shape is first
//! mapped to a [`RawRule`], then [`normalize`] validates it into a [`Rule`].
//! Coverage and redundancy logic only ever see [`Rule`].

use crate::core::address::{ANY_ADDRESS, AddressRange, parse_range};
use crate::core::error::{Error, Result};
use crate::core::ports::{PortFields, PortRange, first_token, parse_port_range};
use crate::core::protocol::Protocol;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use tracing::warn;

/// Field names read for the source expression, in precedence order
pub const SOURCE_ALIASES: [&str; 3] = ["fromCidr", "fromip", "source"];

/// Field names read for the destination expression, in precedence order
pub const DESTINATION_ALIASES: [&str; 3] = ["toCidr", "toip", "destination"];

/// Traffic direction relative to the subnet
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Direction {
    /// Inbound traffic
    Ingress,
    /// Outbound traffic
    Egress,
}

impl Direction {
    /// Returns title-case name for report headings
    pub const fn display_name(self) -> &'static str {
        match self {
            Direction::Ingress => "Ingress",
            Direction::Egress => "Egress",
        }
    }
}

/// A rule as found in the input, with aliases already resolved
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRule {
    pub direction: Option<String>,
    pub protocol: Option<String>,
    pub ports: PortFields,
    pub source: Option<String>,
    pub destination: Option<String>,
    /// Name of the security list the rule came from
    pub collection: Option<String>,
    /// Original record, carried through for reporting
    pub record: Value,
}

impl RawRule {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction: Some(direction.to_string()),
            ..Self::default()
        }
    }

    pub fn protocol(mut self, protocol: &str) -> Self {
        self.protocol = Some(protocol.to_string());
        self
    }

    pub fn ports(mut self, ports: PortFields) -> Self {
        self.ports = ports;
        self
    }

    pub fn source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }

    pub fn destination(mut self, destination: &str) -> Self {
        self.destination = Some(destination.to_string());
        self
    }

    pub fn collection(mut self, name: &str) -> Self {
        self.collection = Some(name.to_string());
        self
    }

    /// Resolves field aliases on a flat JSON record.
    ///
    /// Flat port fields win over nested `tcpOptions` / `udpOptions`. Fields
    /// that match no alias are left untouched in `record`.
    pub fn from_json(record: &Value) -> Self {
        let flat_ports = PortFields::from_json(record);
        let ports = if flat_ports.is_empty() {
            PortFields::from_port_options(record)
        } else {
            flat_ports
        };

        Self {
            direction: first_token(record, &["direction"]),
            protocol: first_token(record, &["protocol"]),
            ports,
            source: first_token(record, &SOURCE_ALIASES),
            destination: first_token(record, &DESTINATION_ALIASES),
            collection: None,
            record: record.clone(),
        }
    }
}

impl From<&Rule> for RawRule {
    fn from(rule: &Rule) -> Self {
        Self {
            direction: Some(rule.direction.to_string()),
            protocol: Some(rule.protocol.as_str().to_string()),
            ports: PortFields::range(rule.port_range.from, rule.port_range.to),
            source: Some(rule.source_expr.clone()),
            destination: Some(rule.dest_expr.clone()),
            collection: rule.collection.clone(),
            record: rule.raw.clone(),
        }
    }
}

/// Canonical, validated rule
///
/// Created once per normalization pass and never mutated. `collection` and
/// `raw` are for reporting only and take no part in containment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub direction: Direction,
    pub protocol: Protocol,
    pub port_range: PortRange,
    pub source_expr: String,
    pub dest_expr: String,
    pub source_range: AddressRange,
    pub dest_range: AddressRange,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub raw: Value,
}

impl Rule {
    /// Field-for-field equality of everything that decides what the rule
    /// matches.
    pub fn same_match(&self, other: &Rule) -> bool {
        self.direction == other.direction
            && self.protocol == other.protocol
            && self.port_range == other.port_range
            && self.source_range == other.source_range
            && self.dest_range == other.dest_range
    }
}

/// Validates a raw rule into its canonical form.
///
/// # Errors
///
/// - [`Error::Validation`] if the direction is missing or not
///   `ingress` / `egress` (case-insensitive)
/// - [`Error::Parse`] for malformed ports or address expressions
pub fn normalize(raw: &RawRule) -> Result<Rule> {
    let direction = resolve_direction(raw.direction.as_deref())?;
    let protocol = Protocol::normalize(raw.protocol.as_deref());
    let port_range = parse_port_range(&raw.ports, &protocol)?;

    let source_expr = expression_or_any(raw.source.as_deref());
    let dest_expr = expression_or_any(raw.destination.as_deref());
    let source_range = parse_range(Some(&source_expr))?;
    let dest_range = parse_range(Some(&dest_expr))?;

    Ok(Rule {
        direction,
        protocol,
        port_range,
        source_expr,
        dest_expr,
        source_range,
        dest_range,
        collection: raw.collection.clone(),
        raw: raw.record.clone(),
    })
}

fn resolve_direction(direction: Option<&str>) -> Result<Direction> {
    let Some(value) = direction else {
        return Err(Error::validation("direction", "rule has no direction"));
    };
    Direction::from_str(value).map_err(|_| {
        Error::validation(
            "direction",
            format!("expected 'ingress' or 'egress', got '{value}'"),
        )
    })
}

fn expression_or_any(expr: Option<&str>) -> String {
    match expr.map(str::trim) {
        None | Some("") => ANY_ADDRESS.to_string(),
        Some(e) => e.to_string(),
    }
}

/// What to do with a rule that fails normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidRulePolicy {
    /// Stop at the first invalid rule
    #[default]
    Abort,
    /// Log and drop invalid rules, keep going
    Skip,
}

/// Normalizes a batch of rules, preserving input order.
///
/// # Errors
///
/// With [`InvalidRulePolicy::Abort`], returns the first normalization error.
pub fn normalize_all(raws: &[RawRule], policy: InvalidRulePolicy) -> Result<Vec<Rule>> {
    let mut rules = Vec::with_capacity(raws.len());
    for (index, raw) in raws.iter().enumerate() {
        match normalize(raw) {
            Ok(rule) => rules.push(rule),
            Err(e) if policy == InvalidRulePolicy::Skip && e.is_rule_error() => {
                warn!(
                    index,
                    collection = raw.collection.as_deref().unwrap_or("-"),
                    "Skipping invalid rule: {e}"
                );
            }
            Err(e) => return Err(e),
        }
    }
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_defaults() {
        let rule = normalize(&RawRule::new(Direction::Egress)).unwrap();
        assert_eq!(rule.direction, Direction::Egress);
        assert_eq!(rule.protocol, Protocol::All);
        assert_eq!(rule.port_range, PortRange::FULL);
        assert_eq!(rule.source_expr, ANY_ADDRESS);
        assert_eq!(rule.dest_expr, ANY_ADDRESS);
        assert!(rule.source_range.is_full());
        assert!(rule.dest_range.is_full());
    }

    #[test]
    fn test_direction_is_case_insensitive() {
        let raw = RawRule {
            direction: Some("INGRESS".into()),
            ..RawRule::default()
        };
        assert_eq!(normalize(&raw).unwrap().direction, Direction::Ingress);
    }

    #[test]
    fn test_rejects_unknown_direction() {
        let raw = RawRule {
            direction: Some("sideways".into()),
            ..RawRule::default()
        };
        let err = normalize(&raw).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert!(err.to_string().contains("sideways"));
    }

    #[test]
    fn test_rejects_missing_direction() {
        let err = normalize(&RawRule::default()).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn test_propagates_address_errors() {
        let raw = RawRule::new(Direction::Ingress).source("10.0.0.0/33");
        assert!(matches!(normalize(&raw), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_from_json_resolves_aliases() {
        let record = json!({
            "direction": "ingress",
            "protocol": "6",
            "fromPort": 22,
            "toPort": 22,
            "fromip": "10.0.0.0/24",
            "destination": "10.1.0.0/16",
            "description": "ssh from office"
        });
        let rule = normalize(&RawRule::from_json(&record)).unwrap();
        assert_eq!(rule.protocol, Protocol::Tcp);
        assert_eq!(rule.port_range, PortRange::single(22));
        assert_eq!(rule.source_expr, "10.0.0.0/24");
        assert_eq!(rule.dest_expr, "10.1.0.0/16");
        assert_eq!(rule.raw["description"], "ssh from office");
    }

    #[test]
    fn test_from_json_source_precedence() {
        let record = json!({
            "direction": "egress",
            "source": "10.9.0.0/16",
            "fromCidr": "10.0.0.0/8"
        });
        let raw = RawRule::from_json(&record);
        assert_eq!(raw.source.as_deref(), Some("10.0.0.0/8"));
    }

    #[test]
    fn test_from_json_nested_port_options() {
        let record = json!({
            "direction": "ingress",
            "protocol": "17",
            "udpOptions": { "destinationPortRange": { "min": 53, "max": 53 } }
        });
        let rule = normalize(&RawRule::from_json(&record)).unwrap();
        assert_eq!(rule.port_range, PortRange::single(53));
    }

    #[test]
    fn test_icmp_type_code_never_ports() {
        let record = json!({
            "direction": "ingress",
            "protocol": "1",
            "icmpOptions": { "type": 3, "code": 4 }
        });
        let rule = normalize(&RawRule::from_json(&record)).unwrap();
        assert_eq!(rule.port_range, PortRange::FULL);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let raw = RawRule::new(Direction::Ingress)
            .protocol("6")
            .ports(PortFields::range(443, 80))
            .source("10.0.0.5/24")
            .collection("web");
        let once = normalize(&raw).unwrap();
        let twice = normalize(&RawRule::from(&once)).unwrap();
        assert_eq!(once, twice);
        assert_eq!(normalize(&raw).unwrap(), once);
    }

    #[test]
    fn test_normalize_does_not_mutate_input() {
        let raw = RawRule::new(Direction::Ingress).protocol("TCP");
        let before = raw.clone();
        let _ = normalize(&raw).unwrap();
        assert_eq!(raw, before);
    }

    #[test]
    fn test_normalize_all_abort() {
        let raws = vec![
            RawRule::new(Direction::Ingress),
            RawRule::default(),
            RawRule::new(Direction::Egress),
        ];
        assert!(normalize_all(&raws, InvalidRulePolicy::Abort).is_err());
    }

    #[test]
    fn test_normalize_all_skip() {
        let raws = vec![
            RawRule::new(Direction::Ingress),
            RawRule::default(),
            RawRule::new(Direction::Egress),
        ];
        let rules = normalize_all(&raws, InvalidRulePolicy::Skip).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].direction, Direction::Ingress);
        assert_eq!(rules[1].direction, Direction::Egress);
    }

    #[test]
    fn test_same_match_ignores_reporting_fields() {
        let a = normalize(&RawRule::new(Direction::Ingress).collection("a")).unwrap();
        let b = normalize(
            &RawRule::new(Direction::Ingress)
                .collection("b")
                .source("0.0.0.0/0"),
        )
        .unwrap();
        assert!(a.same_match(&b));
        assert_ne!(a, b);
    }
}
