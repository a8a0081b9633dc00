//! Routing rule entities.
//!
//! A [`RuleSet`] belongs to one group repository and holds an ordered list of
//! [`RoutingRule`]s. Rule sets are classified as accepted or denied by the
//! map that holds them in the configuration, see [`RuleKind`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::ConfigurationError;

/// Classification of a rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Accepted,
    Denied,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Accepted => write!(f, "accepted"),
            RuleKind::Denied => write!(f, "denied"),
        }
    }
}

/// Pattern plus the repositories it applies to.
///
/// Repository entries are either bare repository ids or `storage:repository`
/// pairs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingRule {
    pub pattern: String,

    #[serde(rename = "repository", default)]
    pub repositories: BTreeSet<String>,
}

impl RoutingRule {
    pub fn new<I, S>(pattern: impl Into<String>, repositories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pattern: pattern.into(),
            repositories: repositories.into_iter().map(Into::into).collect(),
        }
    }
}

/// Ordered rules for one group repository.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSet {
    #[serde(rename = "group-repository")]
    pub group_repository: String,

    #[serde(rename = "rule", default)]
    pub rules: Vec<RoutingRule>,
}

impl RuleSet {
    pub fn new(group_repository: impl Into<String>) -> Self {
        Self {
            group_repository: group_repository.into(),
            rules: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: RoutingRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Rule with exactly this pattern.
    pub fn rule(&self, pattern: &str) -> Option<&RoutingRule> {
        self.rules.iter().find(|r| r.pattern == pattern)
    }

    fn rule_mut(&mut self, pattern: &str) -> Option<&mut RoutingRule> {
        self.rules.iter_mut().find(|r| r.pattern == pattern)
    }

    /// Union `repositories` into the rule for `pattern`, appending a new rule
    /// when none exists.
    pub fn add_repositories(&mut self, pattern: &str, repositories: BTreeSet<String>) {
        match self.rule_mut(pattern) {
            Some(rule) => rule.repositories.extend(repositories),
            None => self.rules.push(RoutingRule {
                pattern: pattern.to_string(),
                repositories,
            }),
        }
    }

    /// Replace the repository set of the rule for `pattern`, appending a new
    /// rule when none exists.
    pub fn override_repositories(&mut self, pattern: &str, repositories: BTreeSet<String>) {
        match self.rule_mut(pattern) {
            Some(rule) => rule.repositories = repositories,
            None => self.rules.push(RoutingRule {
                pattern: pattern.to_string(),
                repositories,
            }),
        }
    }

    /// Remove one repository from the rule for `pattern`. A rule left with no
    /// repositories is dropped.
    pub fn remove_repository(&mut self, pattern: &str, repository: &str) -> Result<(), ConfigurationError> {
        let group = self.group_repository.clone();
        let index = self
            .rules
            .iter()
            .position(|r| r.pattern == pattern)
            .ok_or_else(|| {
                ConfigurationError::NotFound(format!(
                    "no rule with pattern '{}' in rule set '{}'",
                    pattern, group
                ))
            })?;

        let rule = &mut self.rules[index];
        if !rule.repositories.remove(repository) {
            return Err(ConfigurationError::NotFound(format!(
                "repository '{}' is not part of rule '{}' in rule set '{}'",
                repository, pattern, group
            )));
        }
        if rule.repositories.is_empty() {
            self.rules.remove(index);
        }
        Ok(())
    }
}
