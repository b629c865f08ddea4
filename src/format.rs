//! Text rendering of rules for terminal output

use crate::core::inventory::{RouteRule, SecurityRule, SubnetReport};
use crate::core::protocol::Protocol;
use crate::core::rule::{Direction, Rule};
use serde_json::Value;

/// Default width of one padded column
pub const DEFAULT_COLUMN_WIDTH: usize = 25;

const KIND_WIDTH: usize = 10;
const PLACEHOLDER: &str = "-";

/// One-line canonical form of a normalized rule.
///
/// ```
/// use slcheck::core::ports::PortFields;
/// use slcheck::core::rule::{Direction, RawRule, normalize};
/// use slcheck::format::simple;
///
/// let rule = normalize(
///     &RawRule::new(Direction::Ingress)
///         .protocol("6")
///         .ports(PortFields::single(443))
///         .source("10.0.0.0/24")
///         .collection("web-sl"),
/// )
/// .unwrap();
/// assert_eq!(
///     simple(&rule),
///     "[ingress] tcp 443-443 from 10.0.0.0/24 to 0.0.0.0/0 (SL: web-sl)"
/// );
/// ```
pub fn simple(rule: &Rule) -> String {
    let ports = if rule.protocol == Protocol::All || rule.port_range.is_full() {
        "all".to_string()
    } else {
        rule.port_range.to_string()
    };
    let list = rule
        .collection
        .as_ref()
        .map(|name| format!(" (SL: {name})"))
        .unwrap_or_default();

    format!(
        "[{}] {} {} from {} to {}{}",
        rule.direction, rule.protocol, ports, rule.source_expr, rule.dest_expr, list
    )
}

/// Port columns of a listing line: the source range's lower bound and the
/// destination range's upper bound, or ICMP type and code.
fn port_columns(rule: &SecurityRule) -> (String, String) {
    if let Some(opts) = rule.port_options() {
        let from = opts
            .source_port_range
            .as_ref()
            .map_or_else(placeholder, |b| column_value(&b.min));
        let to = opts
            .destination_port_range
            .as_ref()
            .map_or_else(placeholder, |b| column_value(&b.max));
        (from, to)
    } else if let Some(icmp) = &rule.icmp_options {
        let code = icmp.code.as_ref().map_or_else(placeholder, column_value);
        (column_value(&icmp.icmp_type), code)
    } else {
        (placeholder(), placeholder())
    }
}

fn placeholder() -> String {
    PLACEHOLDER.to_string()
}

fn column_value(value: &Value) -> String {
    match value {
        Value::Null => placeholder(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Padded listing line for one security-list rule.
pub fn security_rule_line(kind: Direction, rule: &SecurityRule, width: usize) -> String {
    let (from_port, to_port) = port_columns(rule);
    let protocol = Protocol::normalize(rule.protocol.as_deref());

    format!(
        "{:<KIND_WIDTH$} {:<width$} {:<width$} {:<width$} {:<width$} {:<width$} {}",
        kind.as_ref(),
        format!("from IP {}", rule.source.as_deref().unwrap_or(PLACEHOLDER)),
        format!("port {from_port}"),
        format!("to IP {}", rule.destination.as_deref().unwrap_or(PLACEHOLDER)),
        format!("port {to_port}"),
        format!("protocol {}", protocol.display_name()),
        rule.description.as_deref().unwrap_or(PLACEHOLDER),
    )
}

/// Padded listing line for one route rule.
pub fn route_rule_line(kind: &str, rule: &RouteRule, width: usize) -> String {
    format!(
        "{:<KIND_WIDTH$} {:<width$} {}",
        kind,
        format!("to {}", rule.destination.as_deref().unwrap_or(PLACEHOLDER)),
        rule.description.as_deref().unwrap_or(PLACEHOLDER),
    )
}

/// Text report of one subnet: each removable rule with the rule that covers
/// it and why.
pub fn subnet_report(report: &SubnetReport) -> String {
    let mut out = format!(
        "Subnet {} ({}) in VCN {}\n",
        report.subnet_name, report.cidr, report.vcn_name
    );

    if !report.dedupe.has_removals() {
        out.push_str("No rules to be removed.\n");
        return out;
    }

    for direction in [Direction::Ingress, Direction::Egress] {
        let removed = report.dedupe.removed(direction);
        if removed.is_empty() {
            continue;
        }
        out.push_str(&format!("{} - TO BE REMOVED:\n", direction.display_name()));
        for entry in removed {
            out.push_str(&format!("  - {}\n", simple(&entry.rule)));
            out.push_str(&format!("    covered by: {}\n", simple(&entry.covered_by)));
            out.push_str(&format!("    why:        {}\n\n", entry.why.join(" AND ")));
        }
    }
    out
}
