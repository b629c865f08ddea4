//! Redundant rule detection
//!
//! [`filter_redundant`] partitions an ordered rule list into rules to keep and
//! rules that another rule already covers. [`dedupe`] runs it once per
//! direction for the rules gathered from one subnet.
//!
//! # Ordering
//!
//! For each rule the other rules are scanned in input order and the first one
//! that qualifies wins. The result is therefore order-dependent and not a
//! minimal cover: swapping two rules that cover each other changes which one
//! is reported. Every removed rule is individually covered by its
//! `covered_by` rule.

use crate::core::coverage::covers;
use crate::core::rule::{Direction, Rule};
use serde::Serialize;
use tracing::debug;

/// Justification used when a rule repeats an earlier one exactly
pub const IDENTICAL_REASON: &str = "identical to earlier rule";

/// A rule found to be redundant, with what covers it and why
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedRule {
    pub rule: Rule,
    pub covered_by: Rule,
    /// Input index of `covered_by`
    pub covered_by_index: usize,
    pub why: Vec<String>,
}

/// Partition of a rule list into kept and removed rules
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RedundancyResult {
    pub kept: Vec<Rule>,
    pub removed: Vec<RemovedRule>,
}

impl RedundancyResult {
    pub fn has_removals(&self) -> bool {
        !self.removed.is_empty()
    }
}

/// Splits `rules` into kept and removed rules.
pub fn filter_redundant(rules: &[Rule]) -> RedundancyResult {
    let mut result = RedundancyResult::default();

    for (i, rule) in rules.iter().enumerate() {
        match find_cover(rules, i) {
            Some((j, why)) => {
                debug!(
                    index = i,
                    covered_by = j,
                    direction = %rule.direction,
                    "Rule is redundant: {}",
                    why.join(" AND ")
                );
                result.removed.push(RemovedRule {
                    rule: rule.clone(),
                    covered_by: rules[j].clone(),
                    covered_by_index: j,
                    why,
                });
            }
            None => result.kept.push(rule.clone()),
        }
    }

    result
}

fn find_cover(rules: &[Rule], i: usize) -> Option<(usize, Vec<String>)> {
    let rule = &rules[i];
    rules
        .iter()
        .enumerate()
        .filter(|(j, _)| *j != i)
        .find_map(|(j, other)| {
            // A later duplicate never removes the earlier copy.
            if other.same_match(rule) {
                return (j < i).then(|| (j, vec![IDENTICAL_REASON.to_string()]));
            }
            let coverage = covers(other, rule);
            coverage.covered.then_some((j, coverage.reasons))
        })
}

/// Rules of one subnet, split by direction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubnetRules {
    pub ingress: Vec<Rule>,
    pub egress: Vec<Rule>,
}

impl SubnetRules {
    /// Appends a rule to the list matching its direction.
    pub fn push(&mut self, rule: Rule) {
        match rule.direction {
            Direction::Ingress => self.ingress.push(rule),
            Direction::Egress => self.egress.push(rule),
        }
    }

    pub fn len(&self) -> usize {
        self.ingress.len() + self.egress.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ingress.is_empty() && self.egress.is_empty()
    }
}

impl FromIterator<Rule> for SubnetRules {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        let mut rules = SubnetRules::default();
        for rule in iter {
            rules.push(rule);
        }
        rules
    }
}

/// Redundancy results of one subnet, per direction
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SubnetDedupe {
    pub ingress: RedundancyResult,
    pub egress: RedundancyResult,
}

impl SubnetDedupe {
    pub fn has_removals(&self) -> bool {
        self.ingress.has_removals() || self.egress.has_removals()
    }

    pub fn removed(&self, direction: Direction) -> &[RemovedRule] {
        match direction {
            Direction::Ingress => &self.ingress.removed,
            Direction::Egress => &self.egress.removed,
        }
    }
}

/// Runs the redundancy filter independently for each direction.
pub fn dedupe(rules: &SubnetRules) -> SubnetDedupe {
    SubnetDedupe {
        ingress: filter_redundant(&rules.ingress),
        egress: filter_redundant(&rules.egress),
    }
}
