//! Durability and concurrency of the configuration manager.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use strongbox_config::manager::{ConfigurationStore, FileStore};
use strongbox_config::{Configuration, RuleKind, RuleSet, Storage};

mod common;

use common::{accepted_rule_set, create_proxy_configuration, repository, Fixture};

#[test]
fn test_committed_changes_survive_reopen() {
    let fx = Fixture::new();
    fx.manager.set_port(18080).unwrap();
    fx.manager.set_base_url("http://localhost:18080/strongbox").unwrap();
    fx.manager.set_proxy_configuration(create_proxy_configuration()).unwrap();
    fx.manager.add_or_update_storage(Storage::new("storage0"), false).unwrap();
    fx.manager.add_or_update_repository(repository("storage0", "releases")).unwrap();
    fx.manager.set_accepted_rule_set(accepted_rule_set()).unwrap();

    let reopened = fx.reopen();
    assert_eq!(reopened.configuration(), fx.manager.configuration());
    assert_eq!(reopened.port(), 18080);
    assert!(reopened.repository("storage0", "releases").is_ok());
}

#[test]
fn test_document_round_trip_is_lossless() {
    let fx = Fixture::new();
    fx.manager.add_or_update_storage(Storage::new("storage0"), false).unwrap();
    let mut repo = repository("storage0", "proxied");
    repo.trash_enabled = true;
    repo.proxy_configuration = Some(create_proxy_configuration());
    fx.manager.add_or_update_repository(repo).unwrap();
    fx.manager.set_denied_rule_set(accepted_rule_set()).unwrap();

    let stored = FileStore::new(fx.document_path()).load().unwrap().unwrap();
    assert_eq!(stored, fx.manager.configuration());

    let text = serde_json::to_string(&stored).unwrap();
    let parsed: Configuration = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, stored);
}

#[test]
fn test_rejected_change_is_not_persisted() {
    let fx = Fixture::new();
    fx.manager.set_port(18080).unwrap();
    assert!(fx.manager.set_port(100_000).is_err());

    assert_eq!(fx.reopen().port(), 18080);
}

#[test]
fn test_reload_after_external_edit() {
    let fx = Fixture::new();

    let mut edited = fx.manager.configuration();
    edited.put_storage(Storage::new("edited-by-hand"));
    FileStore::new(fx.document_path()).save(&edited).unwrap();

    assert!(fx.manager.reload().unwrap());
    assert!(fx.manager.storage("edited-by-hand").is_ok());
    assert!(!fx.manager.reload().unwrap());
}

#[test]
fn test_concurrent_mutations_are_not_lost() {
    let fx = Fixture::new();
    fx.manager.add_or_update_storage(Storage::new("storage0"), false).unwrap();
    fx.manager.set_accepted_rule_set(RuleSet::new("group")).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let manager = Arc::clone(&fx.manager);
            thread::spawn(move || {
                for i in 0..10 {
                    let id = format!("repo-{}-{}", t, i);
                    manager.add_or_update_repository(repository("storage0", &id)).unwrap();
                    manager
                        .add_repositories_to_rule(RuleKind::Accepted, "group", ".*", BTreeSet::from([id]))
                        .unwrap();
                    // Readers run alongside writers and always see a consistent snapshot.
                    let snapshot = manager.snapshot();
                    assert!(snapshot.storage("storage0").is_some());
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(fx.manager.storage("storage0").unwrap().repositories.len(), 80);
    let rule_set = fx.manager.rule_set(RuleKind::Accepted, "group").unwrap();
    assert_eq!(rule_set.rules.len(), 1);
    assert_eq!(rule_set.rules[0].repositories.len(), 80);

    assert_eq!(fx.reopen().configuration(), fx.manager.configuration());
}
