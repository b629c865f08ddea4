//! Network inventory snapshot
//!
//! A snapshot is a JSON export of the compartment's VCNs, subnets, security
//! lists and route tables, in the camelCase shape the cloud API returns.
//! Fields this crate does not model are preserved in `extra` so that written
//! lists round-trip unchanged.

use crate::core::error::{Error, Result};
use crate::core::ports::{PortFields, value_token};
use crate::core::redundancy::{SubnetDedupe, SubnetRules, dedupe};
use crate::core::rule::{Direction, InvalidRulePolicy, RawRule, normalize_all};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Maximum number of security lists accepted from one snapshot
///
/// The cloud provider caps lists per VCN far below this.
pub const MAX_SECURITY_LISTS: usize = 10_000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Vcn {
    pub id: String,
    pub display_name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Subnet {
    pub id: String,
    pub display_name: String,
    pub cidr_block: String,
    pub vcn_id: String,
    #[serde(default)]
    pub security_list_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_table_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Port bounds inside TCP/UDP options
///
/// Bounds keep the raw JSON value. Out-of-range or non-numeric bounds are
/// rejected per rule when the rule is normalized, not when the snapshot loads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PortBounds {
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub min: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub max: Value,
}

impl PortBounds {
    pub fn new(min: u16, max: u16) -> Self {
        Self {
            min: min.into(),
            max: max.into(),
        }
    }

    /// Raw bound tokens, for [`parse_port_range`](crate::core::ports::parse_port_range)
    pub fn fields(&self) -> PortFields {
        PortFields {
            from: value_token(&self.min),
            to: value_token(&self.max),
        }
    }

    /// Whether `port` lies within both bounds; `false` unless both are valid ports.
    pub fn contains_port(&self, port: u16) -> bool {
        match (as_port(&self.min), as_port(&self.max)) {
            (Some(min), Some(max)) => min <= port && port <= max,
            _ => false,
        }
    }
}

fn as_port(value: &Value) -> Option<u16> {
    value_token(value)?.trim().parse().ok()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PortOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_port_range: Option<PortBounds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_port_range: Option<PortBounds>,
}

/// ICMP type and code, kept as raw values; never treated as ports
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct IcmpOptions {
    #[serde(rename = "type", default, skip_serializing_if = "Value::is_null")]
    pub icmp_type: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Value>,
}

/// One ingress or egress entry of a security list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SecurityRule {
    /// Protocol token; absent means all protocols
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_stateless: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tcp_options: Option<PortOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub udp_options: Option<PortOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icmp_options: Option<IcmpOptions>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SecurityRule {
    /// TCP or UDP options, whichever is present
    pub fn port_options(&self) -> Option<&PortOptions> {
        self.tcp_options.as_ref().or(self.udp_options.as_ref())
    }

    /// Destination port bounds, if the rule restricts them
    pub fn destination_ports(&self) -> Option<&PortBounds> {
        self.port_options()
            .and_then(|opts| opts.destination_port_range.as_ref())
    }

    /// Looks up a string attribute by its JSON name.
    pub fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "protocol" => self.protocol.clone(),
            "source" => self.source.clone(),
            "destination" => self.destination.clone(),
            "description" => self.description.clone(),
            _ => extra_string(&self.extra, name),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SecurityList {
    pub id: String,
    pub display_name: String,
    pub vcn_id: String,
    #[serde(default)]
    pub ingress_security_rules: Vec<SecurityRule>,
    #[serde(default)]
    pub egress_security_rules: Vec<SecurityRule>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A named rule container that belongs to one VCN
///
/// Implemented by [`SecurityList`] and [`RouteTable`] so the listing commands
/// can filter and write either kind.
pub trait Collection: Serialize {
    fn id(&self) -> &str;
    fn display_name(&self) -> &str;
    fn vcn_id(&self) -> &str;
    /// Top-level string field by its JSON name
    fn attribute(&self, name: &str) -> Option<String>;
}

fn extra_string(extra: &Map<String, Value>, name: &str) -> Option<String> {
    extra.get(name).and_then(|v| match v {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    })
}

fn collection_attribute<C: Collection>(
    collection: &C,
    extra: &Map<String, Value>,
    name: &str,
) -> Option<String> {
    match name {
        "id" => Some(collection.id().to_string()),
        "displayName" => Some(collection.display_name().to_string()),
        "vcnId" => Some(collection.vcn_id().to_string()),
        _ => extra_string(extra, name),
    }
}

impl Collection for SecurityList {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn vcn_id(&self) -> &str {
        &self.vcn_id
    }

    fn attribute(&self, name: &str) -> Option<String> {
        collection_attribute(self, &self.extra, name)
    }
}

impl Collection for RouteTable {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn vcn_id(&self) -> &str {
        &self.vcn_id
    }

    fn attribute(&self, name: &str) -> Option<String> {
        collection_attribute(self, &self.extra, name)
    }
}

impl SecurityList {
    /// Rules of one side of the list
    pub fn rules(&self, direction: Direction) -> &[SecurityRule] {
        match direction {
            Direction::Ingress => &self.ingress_security_rules,
            Direction::Egress => &self.egress_security_rules,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RouteRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_entity_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RouteRule {
    pub fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "destination" => self.destination.clone(),
            "description" => self.description.clone(),
            "networkEntityId" => self.network_entity_id.clone(),
            _ => extra_string(&self.extra, name),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteTable {
    pub id: String,
    pub display_name: String,
    pub vcn_id: String,
    #[serde(default)]
    pub route_rules: Vec<RouteRule>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Complete snapshot of one compartment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Inventory {
    #[serde(default)]
    pub vcns: Vec<Vcn>,
    #[serde(default)]
    pub subnets: Vec<Subnet>,
    #[serde(default)]
    pub security_lists: Vec<SecurityList>,
    #[serde(default)]
    pub route_tables: Vec<RouteTable>,
}

impl Inventory {
    /// Loads a snapshot from disk.
    ///
    /// # Async
    /// Uses `tokio::fs` for non-blocking file I/O.
    pub async fn load(path: &Path) -> Result<Self> {
        let json = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::Inventory(format!("cannot read snapshot {}: {e}", path.display()))
        })?;
        let inventory = Self::from_json(&json)?;
        info!(
            "Loaded inventory {:?}: {} VCN(s), {} subnet(s), {} security list(s), {} route table(s)",
            path,
            inventory.vcns.len(),
            inventory.subnets.len(),
            inventory.security_lists.len(),
            inventory.route_tables.len()
        );
        Ok(inventory)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let inventory: Inventory = serde_json::from_str(json)?;
        if inventory.security_lists.len() > MAX_SECURITY_LISTS {
            return Err(Error::Inventory(format!(
                "snapshot contains {} security lists (max: {MAX_SECURITY_LISTS})",
                inventory.security_lists.len()
            )));
        }
        Ok(inventory)
    }

    /// Display name of a VCN, or its id when the VCN is not in the snapshot.
    pub fn vcn_name<'a>(&'a self, vcn_id: &'a str) -> &'a str {
        self.vcns
            .iter()
            .find(|v| v.id == vcn_id)
            .map_or(vcn_id, |v| v.display_name.as_str())
    }

    pub fn security_list(&self, id: &str) -> Option<&SecurityList> {
        self.security_lists.iter().find(|sl| sl.id == id)
    }

    /// Security lists attached to a subnet, in attachment order.
    ///
    /// Ids missing from the snapshot are logged and skipped.
    pub fn lists_for(&self, subnet: &Subnet) -> Vec<&SecurityList> {
        let by_id: HashMap<&str, &SecurityList> = self
            .security_lists
            .iter()
            .map(|sl| (sl.id.as_str(), sl))
            .collect();

        subnet
            .security_list_ids
            .iter()
            .filter_map(|id| {
                let found = by_id.get(id.as_str()).copied();
                if found.is_none() {
                    warn!(
                        subnet = %subnet.display_name,
                        "Security list {id} not found in snapshot, skipping"
                    );
                }
                found
            })
            .collect()
    }
}

impl RawRule {
    /// Adapts a security-list entry attached to a subnet.
    ///
    /// Ingress rules run from the rule's source into the subnet; egress rules
    /// run from the subnet to the rule's destination. Only the destination
    /// port range of TCP/UDP options is treated as ports.
    pub fn from_security_rule(
        direction: Direction,
        rule: &SecurityRule,
        subnet_cidr: &str,
        list_name: &str,
    ) -> Self {
        let (source, destination) = match direction {
            Direction::Ingress => (rule.source.clone(), Some(subnet_cidr.to_string())),
            Direction::Egress => (Some(subnet_cidr.to_string()), rule.destination.clone()),
        };

        let ports = rule
            .destination_ports()
            .map(PortBounds::fields)
            .unwrap_or_default();

        Self {
            direction: Some(direction.to_string()),
            protocol: rule.protocol.clone(),
            ports,
            source,
            destination,
            collection: Some(list_name.to_string()),
            record: serde_json::to_value(rule).unwrap_or(Value::Null),
        }
    }
}

/// Gathers and normalizes every rule of the lists attached to a subnet.
///
/// Rules keep list attachment order, then list order within each side.
///
/// # Errors
///
/// With [`InvalidRulePolicy::Abort`], the first rule that fails to
/// normalize.
pub fn collect_subnet_rules(
    subnet: &Subnet,
    lists: &[&SecurityList],
    policy: InvalidRulePolicy,
) -> Result<SubnetRules> {
    let mut raws = Vec::new();
    for direction in [Direction::Ingress, Direction::Egress] {
        for list in lists {
            raws.extend(list.rules(direction).iter().map(|rule| {
                RawRule::from_security_rule(direction, rule, &subnet.cidr_block, &list.display_name)
            }));
        }
    }
    Ok(normalize_all(&raws, policy)?.into_iter().collect())
}

/// Dedupe outcome for one subnet, with the context needed to report it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetReport {
    pub subnet_id: String,
    pub subnet_name: String,
    pub cidr: String,
    pub vcn_name: String,
    pub security_lists: Vec<String>,
    #[serde(flatten)]
    pub dedupe: SubnetDedupe,
}

/// Collects a subnet's rules and runs the redundancy filter per direction.
///
/// # Errors
///
/// See [`collect_subnet_rules`].
pub fn dedupe_subnet(
    inventory: &Inventory,
    subnet: &Subnet,
    policy: InvalidRulePolicy,
) -> Result<SubnetReport> {
    let lists = inventory.lists_for(subnet);
    let rules = collect_subnet_rules(subnet, &lists, policy)?;
    let dedupe = dedupe(&rules);

    info!(
        subnet = %subnet.display_name,
        rules = rules.len(),
        removable = dedupe.ingress.removed.len() + dedupe.egress.removed.len(),
        "Deduplicated subnet rules"
    );

    Ok(SubnetReport {
        subnet_id: subnet.id.clone(),
        subnet_name: subnet.display_name.clone(),
        cidr: subnet.cidr_block.clone(),
        vcn_name: inventory.vcn_name(&subnet.vcn_id).to_string(),
        security_lists: lists.iter().map(|l| l.display_name.clone()).collect(),
        dedupe,
    })
}

/// Deduplicates every subnet of the snapshot.
///
/// Subnets are independent, so each one runs on the blocking pool; reports
/// come back in snapshot order.
///
/// # Errors
///
/// The first subnet error in snapshot order, see [`collect_subnet_rules`].
pub async fn dedupe_inventory(
    inventory: Arc<Inventory>,
    policy: InvalidRulePolicy,
) -> Result<Vec<SubnetReport>> {
    let handles: Vec<_> = (0..inventory.subnets.len())
        .map(|index| {
            let inventory = Arc::clone(&inventory);
            tokio::task::spawn_blocking(move || {
                dedupe_subnet(&inventory, &inventory.subnets[index], policy)
            })
        })
        .collect();

    let mut reports = Vec::with_capacity(handles.len());
    for handle in handles {
        let report = handle
            .await
            .map_err(|e| Error::Inventory(format!("dedupe task failed: {e}")))??;
        reports.push(report);
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ports::PortRange;
    use crate::core::protocol::Protocol;
    use serde_json::json;

    fn snapshot() -> Inventory {
        let value = json!({
            "vcns": [{ "id": "vcn1", "displayName": "prod-vcn" }],
            "subnets": [{
                "id": "sn1",
                "displayName": "web",
                "cidrBlock": "10.0.1.0/24",
                "vcnId": "vcn1",
                "securityListIds": ["sl1", "sl2", "missing"]
            }],
            "securityLists": [
                {
                    "id": "sl1",
                    "displayName": "web-sl",
                    "vcnId": "vcn1",
                    "ingressSecurityRules": [{
                        "protocol": "6",
                        "source": "10.0.0.0/24",
                        "tcpOptions": { "destinationPortRange": { "min": 80, "max": 80 } }
                    }],
                    "egressSecurityRules": [{ "protocol": "all", "destination": "0.0.0.0/0" }]
                },
                {
                    "id": "sl2",
                    "displayName": "default-sl",
                    "vcnId": "vcn1",
                    "ingressSecurityRules": [{ "protocol": "-1", "source": "10.0.0.0/16" }],
                    "egressSecurityRules": [],
                    "lifecycleState": "AVAILABLE"
                }
            ]
        });
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_lookups() {
        let inv = snapshot();
        assert_eq!(inv.vcn_name("vcn1"), "prod-vcn");
        assert_eq!(inv.vcn_name("unknown"), "unknown");
        assert!(inv.security_list("sl2").is_some());
        assert!(inv.security_list("nope").is_none());
    }

    #[test]
    fn test_lists_for_skips_missing_ids() {
        let inv = snapshot();
        let lists = inv.lists_for(&inv.subnets[0]);
        let names: Vec<&str> = lists.iter().map(|l| l.display_name.as_str()).collect();
        assert_eq!(names, vec!["web-sl", "default-sl"]);
    }

    #[test]
    fn test_unknown_fields_round_trip() {
        let inv = snapshot();
        let sl2 = inv.security_list("sl2").unwrap();
        assert_eq!(sl2.extra["lifecycleState"], "AVAILABLE");
        let value = serde_json::to_value(sl2).unwrap();
        assert_eq!(value["lifecycleState"], "AVAILABLE");
    }

    #[test]
    fn test_ingress_adapter_uses_subnet_as_destination() {
        let inv = snapshot();
        let sl1 = inv.security_list("sl1").unwrap();
        let raw = RawRule::from_security_rule(
            Direction::Ingress,
            &sl1.ingress_security_rules[0],
            "10.0.1.0/24",
            "web-sl",
        );
        assert_eq!(raw.source.as_deref(), Some("10.0.0.0/24"));
        assert_eq!(raw.destination.as_deref(), Some("10.0.1.0/24"));
        assert_eq!(raw.collection.as_deref(), Some("web-sl"));
        assert_eq!(raw.record["tcpOptions"]["destinationPortRange"]["min"], 80);
    }

    #[test]
    fn test_egress_adapter_uses_subnet_as_source() {
        let rule = SecurityRule {
            protocol: Some("17".into()),
            destination: Some("8.8.8.8/32".into()),
            udp_options: Some(PortOptions {
                source_port_range: Some(PortBounds::new(1024, 2048)),
                destination_port_range: Some(PortBounds::new(53, 53)),
            }),
            ..SecurityRule::default()
        };
        let raw = RawRule::from_security_rule(Direction::Egress, &rule, "10.0.1.0/24", "dns");
        let normalized = crate::core::rule::normalize(&raw).unwrap();
        assert_eq!(normalized.source_expr, "10.0.1.0/24");
        assert_eq!(normalized.dest_expr, "8.8.8.8/32");
        assert_eq!(normalized.protocol, Protocol::Udp);
        assert_eq!(normalized.port_range, PortRange::single(53));
    }

    #[test]
    fn test_collect_subnet_rules_splits_directions() {
        let inv = snapshot();
        let subnet = &inv.subnets[0];
        let lists = inv.lists_for(subnet);
        let rules = collect_subnet_rules(subnet, &lists, InvalidRulePolicy::Abort).unwrap();
        assert_eq!(rules.ingress.len(), 2);
        assert_eq!(rules.egress.len(), 1);
        assert_eq!(rules.ingress[0].collection.as_deref(), Some("web-sl"));
        assert_eq!(rules.ingress[1].collection.as_deref(), Some("default-sl"));
    }

    #[test]
    fn test_dedupe_subnet_report() {
        let inv = snapshot();
        let report = dedupe_subnet(&inv, &inv.subnets[0], InvalidRulePolicy::Abort).unwrap();
        assert_eq!(report.vcn_name, "prod-vcn");
        assert_eq!(report.security_lists, vec!["web-sl", "default-sl"]);

        let removed = &report.dedupe.ingress.removed;
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].rule.collection.as_deref(), Some("web-sl"));
        assert_eq!(removed[0].covered_by.collection.as_deref(), Some("default-sl"));
        assert!(report.dedupe.egress.removed.is_empty());
    }

    #[test]
    fn test_invalid_rule_policy() {
        let mut inv = snapshot();
        inv.security_lists[0].ingress_security_rules[0].source = Some("10.0.0.0/40".into());
        let subnet = inv.subnets[0].clone();

        assert!(dedupe_subnet(&inv, &subnet, InvalidRulePolicy::Abort).is_err());

        let report = dedupe_subnet(&inv, &subnet, InvalidRulePolicy::Skip).unwrap();
        assert_eq!(report.dedupe.ingress.kept.len(), 1);
        assert!(report.dedupe.ingress.removed.is_empty());
    }

    fn snapshot_with_web_ingress(rule: Value) -> Inventory {
        let mut value = serde_json::to_value(snapshot()).unwrap();
        value["securityLists"][0]["ingressSecurityRules"] = json!([rule]);
        Inventory::from_json(&value.to_string()).unwrap()
    }

    #[test]
    fn test_missing_protocol_means_all() {
        let inv = snapshot_with_web_ingress(json!({ "source": "10.0.0.0/24" }));
        let rule = &inv.security_lists[0].ingress_security_rules[0];
        assert!(rule.protocol.is_none());

        let subnet = &inv.subnets[0];
        let lists = inv.lists_for(subnet);
        let rules = collect_subnet_rules(subnet, &lists, InvalidRulePolicy::Abort).unwrap();
        assert_eq!(rules.ingress[0].protocol, Protocol::All);
        assert_eq!(rules.ingress[0].port_range, PortRange::FULL);
    }

    #[test]
    fn test_out_of_range_port_is_a_rule_error() {
        let inv = snapshot_with_web_ingress(json!({
            "protocol": "6",
            "source": "10.0.0.0/24",
            "tcpOptions": { "destinationPortRange": { "min": 70000, "max": 70000 } }
        }));
        let subnet = &inv.subnets[0];

        assert!(matches!(
            dedupe_subnet(&inv, subnet, InvalidRulePolicy::Abort),
            Err(Error::Parse { .. })
        ));

        let report = dedupe_subnet(&inv, subnet, InvalidRulePolicy::Skip).unwrap();
        assert_eq!(report.dedupe.ingress.kept.len(), 1);
        assert_eq!(
            report.dedupe.ingress.kept[0].collection.as_deref(),
            Some("default-sl")
        );
        assert!(report.dedupe.ingress.removed.is_empty());
    }

    #[test]
    fn test_loose_option_values_load() {
        let inv = snapshot_with_web_ingress(json!({
            "protocol": "1",
            "source": "10.0.0.0/24",
            "icmpOptions": { "type": 300, "code": "x" }
        }));
        let icmp = inv.security_lists[0].ingress_security_rules[0]
            .icmp_options
            .as_ref()
            .unwrap();
        assert_eq!(icmp.icmp_type, 300);

        let report = dedupe_subnet(&inv, &inv.subnets[0], InvalidRulePolicy::Abort).unwrap();
        assert_eq!(report.dedupe.ingress.removed.len(), 1);
    }

    #[test]
    fn test_port_bounds_from_strings() {
        let bounds: PortBounds = serde_json::from_value(json!({ "min": "22", "max": 22 })).unwrap();
        assert!(bounds.contains_port(22));
        assert!(!bounds.contains_port(23));
        assert_eq!(bounds.fields(), PortFields::single(22));

        let open: PortBounds = serde_json::from_value(json!({ "min": 70000 })).unwrap();
        assert!(!open.contains_port(22));
        assert_eq!(open.fields().to, None);
    }

    #[test]
    fn test_attribute_lookup() {
        let rule = SecurityRule {
            protocol: Some("6".into()),
            description: Some("Allow HTTP".into()),
            ..SecurityRule::default()
        };
        assert_eq!(rule.attribute("description").as_deref(), Some("Allow HTTP"));
        assert_eq!(rule.attribute("protocol").as_deref(), Some("6"));
        assert!(rule.attribute("source").is_none());
    }

    #[test]
    fn test_collection_attributes() {
        let inv = snapshot();
        let sl2 = inv.security_list("sl2").unwrap();
        assert_eq!(sl2.attribute("displayName").as_deref(), Some("default-sl"));
        assert_eq!(sl2.attribute("vcnId").as_deref(), Some("vcn1"));
        assert_eq!(sl2.attribute("lifecycleState").as_deref(), Some("AVAILABLE"));
        assert!(sl2.attribute("freeformTags").is_none());
    }

    #[tokio::test]
    async fn test_dedupe_inventory_keeps_subnet_order() {
        let mut inv = snapshot();
        let mut second = inv.subnets[0].clone();
        second.id = "sn2".into();
        second.display_name = "web-b".into();
        second.security_list_ids = vec!["sl2".into()];
        inv.subnets.push(second);

        let reports = dedupe_inventory(Arc::new(inv), InvalidRulePolicy::Abort)
            .await
            .unwrap();
        let names: Vec<&str> = reports.iter().map(|r| r.subnet_name.as_str()).collect();
        assert_eq!(names, vec!["web", "web-b"]);
        assert!(reports[0].dedupe.has_removals());
        assert!(!reports[1].dedupe.has_removals());
    }

    #[test]
    fn test_rejects_malformed_snapshot() {
        assert!(matches!(
            Inventory::from_json("{ \"subnets\": 3 }"),
            Err(Error::Serialization(_))
        ));
    }
}
