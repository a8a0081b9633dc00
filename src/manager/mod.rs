//! Configuration manager: the only reader and mutator of the aggregate.
//!
//! # Data Flow
//! ```text
//! Read:
//!     ArcSwap::load → deep clone → caller
//!
//! Mutation:
//!     lock writer mutex
//!     → clone published aggregate
//!     → apply change + validate whole document
//!     → store.save (durable before returning)
//!     → ArcSwap::store (publish)
//!     → unlock
//! ```
//!
//! # Design Decisions
//! - One exclusive writer lock; readers never block on it
//! - A failed change or failed persist leaves the published aggregate untouched
//! - No ambient singleton: callers hold an explicit manager handle

pub mod retention;
pub mod store;
pub mod validation;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::{ConfigurationError, Result};
use crate::model::{Configuration, ProxyConfiguration, Repository, RuleKind, RuleSet, Storage};
use crate::observability::metrics;
use crate::routing::RoutingMatcher;

pub use retention::{NoRetention, RetentionProbe, TrashDirectoryProbe};
pub use store::{ConfigurationStore, FileStore, MemoryStore};

use self::validation::{
    validate_base_url, validate_configuration, validate_pattern, validate_port, validate_proxy,
    validate_repository, validate_rule_set, validate_storage,
};

/// Shared handle over the configuration aggregate.
pub struct ConfigurationManager {
    current: ArcSwap<Configuration>,
    write_lock: Mutex<()>,
    store: Arc<dyn ConfigurationStore>,
    retention: Arc<dyn RetentionProbe>,
}

impl std::fmt::Debug for ConfigurationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigurationManager")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl ConfigurationManager {
    /// Load the persisted configuration, or persist the defaults when the
    /// store is empty.
    pub fn open(store: Arc<dyn ConfigurationStore>) -> Result<Self> {
        let config = match store.load()? {
            Some(config) => {
                validate_configuration(&config).map_err(ConfigurationError::Validation)?;
                tracing::info!(
                    storages = config.storages.len(),
                    port = config.port,
                    "Configuration loaded"
                );
                config
            }
            None => {
                let config = Configuration::default();
                store.save(&config)?;
                tracing::info!("No persisted configuration found, defaults written");
                config
            }
        };

        Ok(Self {
            current: ArcSwap::from_pointee(config),
            write_lock: Mutex::new(()),
            store,
            retention: Arc::new(NoRetention),
        })
    }

    /// Replace the probe consulted by non-forced deletions.
    pub fn with_retention_probe(mut self, probe: Arc<dyn RetentionProbe>) -> Self {
        self.retention = probe;
        self
    }

    /// Cheap shared view of the published aggregate.
    pub fn snapshot(&self) -> Arc<Configuration> {
        self.current.load_full()
    }

    /// Deep, independent copy of the configuration.
    pub fn configuration(&self) -> Configuration {
        Configuration::clone(&self.current.load())
    }

    fn mutate<T>(
        &self,
        operation: &'static str,
        change: impl FnOnce(&mut Configuration) -> Result<T>,
    ) -> Result<T> {
        let _guard = self.write_lock.lock();

        let mut next = self.configuration();
        let result = change(&mut next).and_then(|value| {
            validate_configuration(&next).map_err(ConfigurationError::Validation)?;
            self.store.save(&next)?;
            Ok(value)
        });

        match result {
            Ok(value) => {
                self.current.store(Arc::new(next));
                metrics::record_mutation(operation, "ok");
                Ok(value)
            }
            Err(e) => {
                metrics::record_mutation(operation, e.kind());
                tracing::warn!(operation, error = %e, "Configuration change rejected");
                Err(e)
            }
        }
    }

    // ── whole document ──────────────────────────────────────────────

    pub fn set_configuration(&self, mut config: Configuration) -> Result<()> {
        for storage in config.storages.values_mut() {
            storage.normalize_back_references();
        }
        self.mutate("set_configuration", move |current| {
            *current = config;
            Ok(())
        })?;
        tracing::info!("Configuration replaced");
        Ok(())
    }

    /// Re-read the persisted document. Returns whether anything changed.
    ///
    /// An invalid or unreadable document keeps the current configuration.
    pub fn reload(&self) -> Result<bool> {
        let _guard = self.write_lock.lock();

        let loaded = self.store.load().map_err(ConfigurationError::from).and_then(|loaded| {
            let config = loaded.ok_or_else(|| {
                ConfigurationError::NotFound("persisted configuration document".into())
            })?;
            validate_configuration(&config).map_err(ConfigurationError::Validation)?;
            Ok(config)
        });

        match loaded {
            Ok(config) if config == **self.current.load() => {
                metrics::record_reload("unchanged");
                Ok(false)
            }
            Ok(config) => {
                self.current.store(Arc::new(config));
                metrics::record_reload("ok");
                tracing::info!("Configuration reloaded from store");
                Ok(true)
            }
            Err(e) => {
                metrics::record_reload(e.kind());
                tracing::error!(error = %e, "Failed to reload configuration, keeping current");
                Err(e)
            }
        }
    }

    // ── server settings ─────────────────────────────────────────────

    pub fn port(&self) -> u16 {
        self.current.load().port
    }

    pub fn set_port(&self, port: i64) -> Result<()> {
        let port = validate_port(port).map_err(|e| ConfigurationError::Validation(vec![e]))?;
        self.mutate("set_port", |config| {
            config.port = port;
            Ok(())
        })?;
        tracing::info!(port, "Port updated");
        Ok(())
    }

    pub fn base_url(&self) -> String {
        self.current.load().base_url.clone()
    }

    pub fn set_base_url(&self, base_url: &str) -> Result<()> {
        let errors = validate_base_url(base_url);
        if !errors.is_empty() {
            return Err(ConfigurationError::Validation(errors));
        }
        self.mutate("set_base_url", |config| {
            config.base_url = base_url.to_string();
            Ok(())
        })?;
        tracing::info!(base_url, "Base URL updated");
        Ok(())
    }

    /// Global proxy settings, or those of one repository when `scope` names
    /// a `(storage, repository)` pair.
    pub fn proxy_configuration(&self, scope: Option<(&str, &str)>) -> Result<Option<ProxyConfiguration>> {
        let config = self.current.load();
        match scope {
            None => Ok(config.proxy_configuration.clone()),
            Some((storage_id, repository_id)) => config
                .repository(storage_id, repository_id)
                .map(|r| r.proxy_configuration.clone())
                .ok_or_else(|| repository_not_found(storage_id, repository_id)),
        }
    }

    pub fn set_proxy_configuration(&self, proxy: ProxyConfiguration) -> Result<()> {
        let errors = validate_proxy("proxy-configuration", &proxy);
        if !errors.is_empty() {
            return Err(ConfigurationError::Validation(errors));
        }
        let host = proxy.host.clone();
        self.mutate("set_proxy_configuration", move |config| {
            config.proxy_configuration = Some(proxy);
            Ok(())
        })?;
        tracing::info!(host = %host, "Global proxy configuration updated");
        Ok(())
    }

    // ── storages & repositories ─────────────────────────────────────

    pub fn storage(&self, storage_id: &str) -> Result<Storage> {
        self.current
            .load()
            .storage(storage_id)
            .cloned()
            .ok_or_else(|| {
                tracing::debug!(storage_id, "Storage lookup missed");
                storage_not_found(storage_id)
            })
    }

    pub fn add_or_update_storage(&self, mut storage: Storage, overwrite: bool) -> Result<()> {
        storage.normalize_back_references();
        let errors = validate_storage(&storage);
        if !errors.is_empty() {
            return Err(ConfigurationError::Validation(errors));
        }
        let storage_id = storage.id.clone();
        let replaced = self.mutate("add_or_update_storage", move |config| {
            if config.storage(&storage.id).is_some() && !overwrite {
                return Err(ConfigurationError::Conflict(format!(
                    "storage '{}' already exists",
                    storage.id
                )));
            }
            Ok(config.put_storage(storage).is_some())
        })?;
        tracing::info!(storage_id = %storage_id, replaced, "Storage stored");
        Ok(())
    }

    pub fn delete_storage(&self, storage_id: &str, force: bool) -> Result<()> {
        let removed = self.mutate("delete_storage", |config| {
            let storage = config
                .storage(storage_id)
                .ok_or_else(|| storage_not_found(storage_id))?;
            if !force {
                if let Some(repo) = storage
                    .repositories
                    .values()
                    .find(|r| self.retention.has_retained_state(r))
                {
                    return Err(ConfigurationError::Conflict(format!(
                        "repository '{}:{}' has retained state, use force to delete storage '{}'",
                        storage_id, repo.id, storage_id
                    )));
                }
            }
            let storage = config.storages.remove(storage_id).unwrap_or_default();
            Ok(storage.repositories.len())
        })?;
        tracing::info!(storage_id, repositories = removed, force, "Storage deleted");
        Ok(())
    }

    pub fn repository(&self, storage_id: &str, repository_id: &str) -> Result<Repository> {
        self.current
            .load()
            .repository(storage_id, repository_id)
            .cloned()
            .ok_or_else(|| repository_not_found(storage_id, repository_id))
    }

    /// Register or replace a repository in the storage it references.
    pub fn add_or_update_repository(&self, repository: Repository) -> Result<()> {
        let mut errors = validate_repository("repository", &repository);
        let storage_id = match repository.storage_id.as_deref() {
            Some(id) if !id.trim().is_empty() => id.to_string(),
            _ => {
                errors.push(crate::error::ValidationError::new(
                    "repository.storage",
                    "storage reference must be set",
                ));
                String::new()
            }
        };
        if !errors.is_empty() {
            return Err(ConfigurationError::Validation(errors));
        }

        let repository_id = repository.id.clone();
        let replaced = self.mutate("add_or_update_repository", |config| {
            let storage = config.storage_mut(&storage_id).ok_or_else(|| {
                ConfigurationError::invalid(
                    "repository.storage",
                    format!("storage '{}' does not exist", storage_id),
                )
            })?;
            Ok(storage.put_repository(repository).is_some())
        })?;
        tracing::info!(storage_id = %storage_id, repository_id = %repository_id, replaced, "Repository stored");
        Ok(())
    }

    pub fn delete_repository(&self, storage_id: &str, repository_id: &str, force: bool) -> Result<()> {
        self.mutate("delete_repository", |config| {
            let storage = config
                .storage_mut(storage_id)
                .ok_or_else(|| repository_not_found(storage_id, repository_id))?;
            let repository = storage
                .repository(repository_id)
                .ok_or_else(|| repository_not_found(storage_id, repository_id))?;
            if !force && self.retention.has_retained_state(repository) {
                return Err(ConfigurationError::Conflict(format!(
                    "repository '{}:{}' has retained state, use force to delete it",
                    storage_id, repository_id
                )));
            }
            storage.remove_repository(repository_id);
            Ok(())
        })?;
        tracing::info!(storage_id, repository_id, force, "Repository deleted");
        Ok(())
    }

    // ── routing rules ───────────────────────────────────────────────

    pub fn rule_set(&self, kind: RuleKind, group_repository: &str) -> Result<RuleSet> {
        self.current
            .load()
            .rule_set(kind, group_repository)
            .cloned()
            .ok_or_else(|| rule_set_not_found(kind, group_repository))
    }

    /// Insert a rule set, replacing any with the same group repository.
    pub fn set_rule_set(&self, kind: RuleKind, rule_set: RuleSet) -> Result<()> {
        let errors = validate_rule_set("rule-set", &rule_set);
        if !errors.is_empty() {
            return Err(ConfigurationError::Validation(errors));
        }
        let group = rule_set.group_repository.clone();
        let rules = rule_set.rules.len();
        self.mutate("set_rule_set", move |config| {
            config.put_rule_set(kind, rule_set);
            Ok(())
        })?;
        tracing::info!(kind = %kind, group_repository = %group, rules, "Rule set stored");
        Ok(())
    }

    pub fn set_accepted_rule_set(&self, rule_set: RuleSet) -> Result<()> {
        self.set_rule_set(RuleKind::Accepted, rule_set)
    }

    pub fn set_denied_rule_set(&self, rule_set: RuleSet) -> Result<()> {
        self.set_rule_set(RuleKind::Denied, rule_set)
    }

    pub fn remove_rule_set(&self, kind: RuleKind, group_repository: &str) -> Result<()> {
        self.mutate("remove_rule_set", |config| {
            config
                .routing_rules
                .of_mut(kind)
                .remove(group_repository)
                .map(|_| ())
                .ok_or_else(|| rule_set_not_found(kind, group_repository))
        })?;
        tracing::info!(kind = %kind, group_repository, "Rule set removed");
        Ok(())
    }

    /// Union repositories into the rule with exactly this pattern, creating
    /// the rule when absent.
    pub fn add_repositories_to_rule(
        &self,
        kind: RuleKind,
        group_repository: &str,
        pattern: &str,
        repositories: BTreeSet<String>,
    ) -> Result<()> {
        self.edit_rule_set("add_repositories_to_rule", kind, group_repository, pattern, |set| {
            set.add_repositories(pattern, repositories);
            Ok(())
        })
    }

    /// Remove one repository from a rule, dropping the rule once empty.
    pub fn remove_repository_from_rule(
        &self,
        kind: RuleKind,
        group_repository: &str,
        pattern: &str,
        repository_id: &str,
    ) -> Result<()> {
        self.edit_rule_set("remove_repository_from_rule", kind, group_repository, pattern, |set| {
            set.remove_repository(pattern, repository_id)
        })
    }

    /// Replace the repository set of a rule, creating the rule when absent.
    pub fn override_repositories_for_rule(
        &self,
        kind: RuleKind,
        group_repository: &str,
        pattern: &str,
        repositories: BTreeSet<String>,
    ) -> Result<()> {
        self.edit_rule_set("override_repositories_for_rule", kind, group_repository, pattern, |set| {
            set.override_repositories(pattern, repositories);
            Ok(())
        })
    }

    fn edit_rule_set(
        &self,
        operation: &'static str,
        kind: RuleKind,
        group_repository: &str,
        pattern: &str,
        edit: impl FnOnce(&mut RuleSet) -> Result<()>,
    ) -> Result<()> {
        let errors = validate_pattern("rule.pattern", pattern);
        if !errors.is_empty() {
            return Err(ConfigurationError::Validation(errors));
        }
        self.mutate(operation, |config| {
            let set = config
                .rule_set_mut(kind, group_repository)
                .ok_or_else(|| rule_set_not_found(kind, group_repository))?;
            edit(set)
        })?;
        tracing::info!(operation, kind = %kind, group_repository, pattern, "Routing rule updated");
        Ok(())
    }

    /// Compile the current routing rules for request-time matching.
    pub fn routing_matcher(&self) -> Result<RoutingMatcher> {
        RoutingMatcher::from_config(&self.current.load())
    }
}

fn storage_not_found(storage_id: &str) -> ConfigurationError {
    ConfigurationError::NotFound(format!("storage '{}'", storage_id))
}

fn repository_not_found(storage_id: &str, repository_id: &str) -> ConfigurationError {
    ConfigurationError::NotFound(format!("repository '{}:{}'", storage_id, repository_id))
}

fn rule_set_not_found(kind: RuleKind, group_repository: &str) -> ConfigurationError {
    ConfigurationError::NotFound(format!("{} rule set '{}'", kind, group_repository))
}
