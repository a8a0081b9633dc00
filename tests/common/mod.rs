//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use strongbox_config::manager::{ConfigurationManager, FileStore, RetentionProbe};
use strongbox_config::{ProxyConfiguration, ProxyType, Repository, RoutingRule, RuleSet};

/// A manager persisting to a JSON document inside a temporary directory.
pub struct Fixture {
    pub dir: TempDir,
    pub manager: Arc<ConfigurationManager>,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let manager = open(&dir.path().join("strongbox.json"));
        Self { dir, manager }
    }

    pub fn with_retention<P: RetentionProbe + 'static>(probe: P) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileStore::new(dir.path().join("strongbox.json")));
        let manager = ConfigurationManager::open(store)
            .unwrap()
            .with_retention_probe(Arc::new(probe));
        Self {
            dir,
            manager: Arc::new(manager),
        }
    }

    pub fn document_path(&self) -> PathBuf {
        self.dir.path().join("strongbox.json")
    }

    /// A fresh manager over the same document.
    pub fn reopen(&self) -> Arc<ConfigurationManager> {
        open(&self.document_path())
    }
}

pub fn open(path: &std::path::Path) -> Arc<ConfigurationManager> {
    let store = Arc::new(FileStore::new(path));
    Arc::new(ConfigurationManager::open(store).unwrap())
}

pub fn create_proxy_configuration() -> ProxyConfiguration {
    let mut pc = ProxyConfiguration::new("localhost", 8080)
        .with_credentials("user1", "pass2")
        .with_non_proxy_hosts(["localhost", "some-hosts.com"]);
    pc.proxy_type = ProxyType::Http;
    pc
}

pub fn accepted_rule_set() -> RuleSet {
    RuleSet::new("group-releases-2").with_rule(RoutingRule::new(
        ".*some.test",
        ["releases-with-trash", "releases-with-redeployment"],
    ))
}

pub fn repository(storage: &str, id: &str) -> Repository {
    Repository::new(id).in_storage(storage)
}
