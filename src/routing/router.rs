//! Rule set lookup and routing decisions.
//!
//! # Responsibilities
//! - Store compiled rule sets per group repository
//! - Find the first matching rule of a classification
//! - Combine accepted and denied rules into one decision
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) group lookup via HashMap, O(n) scan over the group's rules
//! - First match wins, in rule insertion order
//! - Accepted rules are consulted before denied rules
//! - Explicit Unmatched rather than silent default

use std::collections::HashMap;

use crate::error::ConfigurationError;
use crate::model::{Configuration, RoutingRule, RuleKind, RuleSet};
use crate::routing::matcher::{Candidate, CompiledRule};

/// Outcome of evaluating the rules of a group repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingDecision<'a> {
    Accepted(&'a RoutingRule),
    Denied(&'a RoutingRule),
    /// No rule applies; the caller falls back to its default policy.
    Unmatched,
}

/// Compiled, read-only view over the routing rules of one configuration.
#[derive(Debug, Default)]
pub struct RoutingMatcher {
    accepted: HashMap<String, Vec<CompiledRule>>,
    denied: HashMap<String, Vec<CompiledRule>>,
}

impl RoutingMatcher {
    /// Compile every rule set of a configuration snapshot.
    pub fn from_config(config: &Configuration) -> Result<Self, ConfigurationError> {
        Ok(Self {
            accepted: compile_sets(RuleKind::Accepted, config.routing_rules.accepted.values())?,
            denied: compile_sets(RuleKind::Denied, config.routing_rules.denied.values())?,
        })
    }

    fn sets(&self, kind: RuleKind) -> &HashMap<String, Vec<CompiledRule>> {
        match kind {
            RuleKind::Accepted => &self.accepted,
            RuleKind::Denied => &self.denied,
        }
    }

    /// First rule of `kind` in `group_repository` matching both candidate and path.
    pub fn matches(
        &self,
        kind: RuleKind,
        group_repository: &str,
        candidate: &Candidate<'_>,
        path: &str,
    ) -> Option<&RoutingRule> {
        self.sets(kind)
            .get(group_repository)?
            .iter()
            .find(|rule| rule.matches(candidate, path))
            .map(CompiledRule::rule)
    }

    pub fn decide(&self, group_repository: &str, candidate: &Candidate<'_>, path: &str) -> RoutingDecision<'_> {
        if let Some(rule) = self.matches(RuleKind::Accepted, group_repository, candidate, path) {
            return RoutingDecision::Accepted(rule);
        }
        if let Some(rule) = self.matches(RuleKind::Denied, group_repository, candidate, path) {
            return RoutingDecision::Denied(rule);
        }
        RoutingDecision::Unmatched
    }
}

fn compile_sets<'a>(
    kind: RuleKind,
    sets: impl Iterator<Item = &'a RuleSet>,
) -> Result<HashMap<String, Vec<CompiledRule>>, ConfigurationError> {
    let mut compiled = HashMap::new();
    for set in sets {
        let rules = set
            .rules
            .iter()
            .map(|rule| {
                CompiledRule::new(rule.clone()).map_err(|e| {
                    ConfigurationError::invalid(
                        format!("routing-rules.{}.{}", kind, set.group_repository),
                        format!("invalid pattern '{}': {}", rule.pattern, e),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        compiled.insert(set.group_repository.clone(), rules);
    }
    Ok(compiled)
}
