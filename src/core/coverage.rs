//! Rule subsumption
//!
//! A candidate rule covers a target rule when every flow the target admits is
//! also admitted by the candidate. Dimensions are checked in a fixed order
//! (protocol, ports, source, destination) and checking stops at the first
//! one that fails.

use crate::core::protocol::Protocol;
use crate::core::rule::Rule;
use serde::Serialize;

/// Outcome of a coverage check
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Coverage {
    pub covered: bool,
    /// One entry per dimension that held, in checking order
    pub reasons: Vec<String>,
}

impl Coverage {
    fn rejected(reasons: Vec<String>) -> Self {
        Self {
            covered: false,
            reasons,
        }
    }
}

/// Decides whether `candidate` fully covers `target`.
///
/// Rules of different direction are never compared and yield no reasons.
pub fn covers(candidate: &Rule, target: &Rule) -> Coverage {
    let mut reasons = Vec::with_capacity(4);

    if candidate.direction != target.direction {
        return Coverage::rejected(reasons);
    }

    if candidate.protocol != Protocol::All && candidate.protocol != target.protocol {
        return Coverage::rejected(reasons);
    }
    reasons.push(format!(
        "protocol {} is a superset of {}",
        candidate.protocol, target.protocol
    ));

    if !candidate.port_range.contains(&target.port_range) {
        return Coverage::rejected(reasons);
    }
    reasons.push(format!(
        "ports {} is a superset of {}",
        candidate.port_range, target.port_range
    ));

    if !candidate.source_range.contains(&target.source_range) {
        return Coverage::rejected(reasons);
    }
    reasons.push(format!(
        "source {} is a superset of {}",
        candidate.source_expr, target.source_expr
    ));

    if !candidate.dest_range.contains(&target.dest_range) {
        return Coverage::rejected(reasons);
    }
    reasons.push(format!(
        "destination {} is a superset of {}",
        candidate.dest_expr, target.dest_expr
    ));

    Coverage {
        covered: true,
        reasons,
    }
}
