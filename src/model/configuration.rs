//! Configuration aggregate root.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::proxy::ProxyConfiguration;
use crate::model::repository::Repository;
use crate::model::routing::{RuleKind, RuleSet};
use crate::model::storage::Storage;

pub const DEFAULT_PORT: u16 = 48080;

/// Accepted and denied rule sets, each keyed by group repository.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoutingRules {
    pub accepted: BTreeMap<String, RuleSet>,
    pub denied: BTreeMap<String, RuleSet>,
}

impl RoutingRules {
    pub fn of(&self, kind: RuleKind) -> &BTreeMap<String, RuleSet> {
        match kind {
            RuleKind::Accepted => &self.accepted,
            RuleKind::Denied => &self.denied,
        }
    }

    pub fn of_mut(&mut self, kind: RuleKind) -> &mut BTreeMap<String, RuleSet> {
        match kind {
            RuleKind::Accepted => &mut self.accepted,
            RuleKind::Denied => &mut self.denied,
        }
    }
}

/// Process-wide configuration state.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Configuration {
    pub port: u16,

    pub base_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_configuration: Option<ProxyConfiguration>,

    /// Storages keyed by storage id.
    pub storages: BTreeMap<String, Storage>,

    pub routing_rules: RoutingRules,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            base_url: format!("http://localhost:{}/", DEFAULT_PORT),
            proxy_configuration: None,
            storages: BTreeMap::new(),
            routing_rules: RoutingRules::default(),
        }
    }
}

impl Configuration {
    pub fn storage(&self, id: &str) -> Option<&Storage> {
        self.storages.get(id)
    }

    pub fn storage_mut(&mut self, id: &str) -> Option<&mut Storage> {
        self.storages.get_mut(id)
    }

    pub fn repository(&self, storage_id: &str, repository_id: &str) -> Option<&Repository> {
        self.storage(storage_id)
            .and_then(|s| s.repository(repository_id))
    }

    /// Insert or replace a storage. Its repositories are pointed back at it.
    pub fn put_storage(&mut self, mut storage: Storage) -> Option<Storage> {
        storage.normalize_back_references();
        self.storages.insert(storage.id.clone(), storage)
    }

    pub fn rule_set(&self, kind: RuleKind, group_repository: &str) -> Option<&RuleSet> {
        self.routing_rules.of(kind).get(group_repository)
    }

    pub fn rule_set_mut(&mut self, kind: RuleKind, group_repository: &str) -> Option<&mut RuleSet> {
        self.routing_rules.of_mut(kind).get_mut(group_repository)
    }

    pub fn put_rule_set(&mut self, kind: RuleKind, rule_set: RuleSet) -> Option<RuleSet> {
        self.routing_rules
            .of_mut(kind)
            .insert(rule_set.group_repository.clone(), rule_set)
    }

    /// Every repository across all storages.
    pub fn repositories(&self) -> impl Iterator<Item = &Repository> {
        self.storages.values().flat_map(|s| s.repositories.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::routing::RoutingRule;

    #[test]
    fn test_defaults() {
        let config = Configuration::default();
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.base_url.ends_with("48080/"));
        assert!(config.storages.is_empty());
    }

    #[test]
    fn test_document_layout() {
        let mut config = Configuration::default();
        let mut storage = Storage::new("storage0");
        storage.put_repository(Repository::new("releases"));
        config.put_storage(storage);
        config.put_rule_set(
            RuleKind::Accepted,
            RuleSet::new("group-releases").with_rule(RoutingRule::new(".*", ["releases"])),
        );

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["base-url"], config.base_url);
        assert_eq!(json["storages"]["storage0"]["repositories"]["releases"]["storage"], "storage0");
        assert_eq!(
            json["routing-rules"]["accepted"]["group-releases"]["group-repository"],
            "group-releases"
        );
        assert!(json["routing-rules"]["denied"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let config: Configuration = serde_json::from_str(r#"{"port": 18080}"#).unwrap();
        assert_eq!(config.port, 18080);
        assert_eq!(config.base_url, Configuration::default().base_url);
    }

    #[test]
    fn test_repositories_iterates_all_storages() {
        let mut config = Configuration::default();
        for id in ["s1", "s2"] {
            let mut storage = Storage::new(id);
            storage.put_repository(Repository::new("r"));
            config.put_storage(storage);
        }
        assert_eq!(config.repositories().count(), 2);
    }
}
