//! Rule matching logic.
//!
//! # Responsibilities
//! - Compile rule patterns into regular expressions
//! - Match artifact paths against a compiled pattern
//! - Match candidate repositories against a rule's repository set
//!
//! # Design Decisions
//! - Patterns are fully anchored: the whole path must match
//! - Matching is case-sensitive
//! - A repository entry matches either the bare id or `storage:repository`

use regex::Regex;

use crate::model::RoutingRule;

/// Compile a rule pattern anchored at both ends.
pub fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{})$", pattern))
}

/// Repository being considered for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub storage_id: Option<&'a str>,
    pub repository_id: &'a str,
}

impl<'a> Candidate<'a> {
    pub fn new(repository_id: &'a str) -> Self {
        Self {
            storage_id: None,
            repository_id,
        }
    }

    pub fn in_storage(storage_id: &'a str, repository_id: &'a str) -> Self {
        Self {
            storage_id: Some(storage_id),
            repository_id,
        }
    }
}

/// A routing rule paired with its compiled pattern.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    rule: RoutingRule,
    regex: Regex,
}

impl CompiledRule {
    pub fn new(rule: RoutingRule) -> Result<Self, regex::Error> {
        let regex = compile_pattern(&rule.pattern)?;
        Ok(Self { rule, regex })
    }

    pub fn rule(&self) -> &RoutingRule {
        &self.rule
    }

    pub fn applies_to(&self, candidate: &Candidate<'_>) -> bool {
        self.rule.repositories.iter().any(|entry| match entry.split_once(':') {
            Some((storage, repository)) => {
                candidate.storage_id == Some(storage) && candidate.repository_id == repository
            }
            None => entry == candidate.repository_id,
        })
    }

    pub fn matches_path(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    pub fn matches(&self, candidate: &Candidate<'_>, path: &str) -> bool {
        self.applies_to(candidate) && self.matches_path(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_is_anchored() {
        let rule = CompiledRule::new(RoutingRule::new(".*some.test", ["r"])).unwrap();
        assert!(rule.matches_path("org/carlspring/some.test"));
        assert!(!rule.matches_path("org/carlspring/some.test/extra"));

        let prefix = CompiledRule::new(RoutingRule::new("org/.*", ["r"])).unwrap();
        assert!(!prefix.matches_path("com/org/x"));
    }

    #[test]
    fn test_pattern_is_case_sensitive() {
        let rule = CompiledRule::new(RoutingRule::new("org/.*", ["r"])).unwrap();
        assert!(!rule.matches_path("ORG/foo"));
    }

    #[test]
    fn test_alternation_stays_anchored() {
        let rule = CompiledRule::new(RoutingRule::new("a|b", ["r"])).unwrap();
        assert!(rule.matches_path("a"));
        assert!(!rule.matches_path("ab"));
    }

    #[test]
    fn test_repository_entry_forms() {
        let rule = CompiledRule::new(RoutingRule::new(".*", ["releases", "storage1:snapshots"])).unwrap();

        assert!(rule.applies_to(&Candidate::new("releases")));
        assert!(rule.applies_to(&Candidate::in_storage("storage0", "releases")));
        assert!(rule.applies_to(&Candidate::in_storage("storage1", "snapshots")));
        assert!(!rule.applies_to(&Candidate::in_storage("storage0", "snapshots")));
        assert!(!rule.applies_to(&Candidate::new("snapshots")));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(compile_pattern("(unclosed").is_err());
    }
}
