//! Search queries over security lists and route tables
//!
//! The listing commands accept at most one query. A rule matches a port
//! query when either of its TCP/UDP port ranges includes the port, an IP
//! query when the address appears in, or falls inside, the rule's source or
//! destination, and an attribute query when the named field contains the
//! needle, ignoring case.

use crate::core::address::{MembershipPolicy, ip_in_cidr};
use crate::core::inventory::{
    Collection, PortBounds, RouteRule, RouteTable, SecurityList, SecurityRule,
};
use crate::core::rule::Direction;
use std::fmt;
use std::net::Ipv4Addr;

/// A single search criterion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Port(u16),
    Ip(Ipv4Addr),
    Attribute { name: String, needle: String },
}

impl Query {
    pub fn attribute(name: impl Into<String>, needle: impl Into<String>) -> Self {
        Self::Attribute {
            name: name.into(),
            needle: needle.into(),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Port(port) => write!(f, "port={port}"),
            Self::Ip(ip) => write!(f, "ip={ip}"),
            Self::Attribute { name, needle } => write!(f, "{name}={needle}"),
        }
    }
}

fn bounds_contain(bounds: Option<&PortBounds>, port: u16) -> bool {
    bounds.is_some_and(|b| b.contains_port(port))
}

fn contains_ignore_case(haystack: Option<String>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(&needle.to_lowercase()))
}

fn address_matches(expr: Option<&str>, ip: Ipv4Addr, policy: MembershipPolicy) -> bool {
    expr.is_some_and(|expr| expr.contains(&ip.to_string()) || ip_in_cidr(ip, expr, policy))
}

/// Returns true if a security rule involves the queried port, address or text.
pub fn rule_matches(rule: &SecurityRule, query: &Query, policy: MembershipPolicy) -> bool {
    match query {
        Query::Port(port) => rule.port_options().is_some_and(|opts| {
            bounds_contain(opts.source_port_range.as_ref(), *port)
                || bounds_contain(opts.destination_port_range.as_ref(), *port)
        }),
        Query::Ip(ip) => {
            address_matches(rule.source.as_deref(), *ip, policy)
                || address_matches(rule.destination.as_deref(), *ip, policy)
        }
        Query::Attribute { name, needle } => contains_ignore_case(rule.attribute(name), needle),
    }
}

/// Returns true if a route rule involves the queried address or text.
///
/// Route rules carry no ports, so port queries never match.
pub fn route_rule_matches(rule: &RouteRule, query: &Query, policy: MembershipPolicy) -> bool {
    match query {
        Query::Port(_) => false,
        Query::Ip(ip) => address_matches(rule.destination.as_deref(), *ip, policy),
        Query::Attribute { name, needle } => contains_ignore_case(rule.attribute(name), needle),
    }
}

/// Returns true if the collection's own fields match an attribute query.
///
/// Port and IP queries only apply to individual rules.
pub fn list_matches<C: Collection>(collection: &C, query: &Query) -> bool {
    match query {
        Query::Attribute { name, needle } => {
            contains_ignore_case(collection.attribute(name), needle)
        }
        Query::Port(_) | Query::Ip(_) => false,
    }
}

/// What a search found in one collection
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<R> {
    /// The collection's own fields matched the query
    pub collection_matched: bool,
    /// Matching rules, in collection order; empty when the collection matched
    pub rules: Vec<R>,
}

impl<R> Selection<R> {
    /// A collection is written out when it or any of its rules matched.
    pub fn is_hit(&self) -> bool {
        self.collection_matched || !self.rules.is_empty()
    }
}

/// Searches a security list. Without a query every rule is selected.
pub fn select_security_rules<'a>(
    list: &'a SecurityList,
    query: Option<&Query>,
    policy: MembershipPolicy,
) -> Selection<(Direction, &'a SecurityRule)> {
    if query.is_some_and(|q| list_matches(list, q)) {
        return Selection {
            collection_matched: true,
            rules: Vec::new(),
        };
    }

    let rules = [Direction::Ingress, Direction::Egress]
        .into_iter()
        .flat_map(|direction| list.rules(direction).iter().map(move |r| (direction, r)))
        .filter(|(_, rule)| query.is_none_or(|q| rule_matches(rule, q, policy)))
        .collect();
    Selection {
        collection_matched: false,
        rules,
    }
}

/// Searches a route table. Without a query every rule is selected.
pub fn select_route_rules<'a>(
    table: &'a RouteTable,
    query: Option<&Query>,
    policy: MembershipPolicy,
) -> Selection<&'a RouteRule> {
    if query.is_some_and(|q| list_matches(table, q)) {
        return Selection {
            collection_matched: true,
            rules: Vec::new(),
        };
    }

    let rules = table
        .route_rules
        .iter()
        .filter(|rule| query.is_none_or(|q| route_rule_matches(rule, q, policy)))
        .collect();
    Selection {
        collection_matched: false,
        rules,
    }
}
