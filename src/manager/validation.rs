//! Semantic validation of arguments and whole configuration documents.
//!
//! # Responsibilities
//! - Value ranges (ports, non-empty ids)
//! - Base URL must parse as an absolute URL
//! - Routing patterns must compile
//! - Map keys must agree with the ids of the entities they hold
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Pure functions over borrowed data, run before a change is accepted

use url::Url;

use crate::error::ValidationError;
use crate::model::{Configuration, ProxyConfiguration, Repository, RuleSet, Storage};
use crate::routing::matcher::compile_pattern;

/// Check a port given as a wide integer and narrow it.
pub fn validate_port(port: i64) -> Result<u16, ValidationError> {
    u16::try_from(port).map_err(|_| {
        ValidationError::new("port", format!("{} is outside 0..=65535", port))
    })
}

pub fn validate_base_url(base_url: &str) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if base_url.trim().is_empty() {
        errors.push(ValidationError::new("base-url", "must not be empty"));
    } else if let Err(e) = Url::parse(base_url) {
        errors.push(ValidationError::new(
            "base-url",
            format!("'{}' is not an absolute URL: {}", base_url, e),
        ));
    }
    errors
}

pub fn validate_proxy(field: &str, proxy: &ProxyConfiguration) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if proxy.host.trim().is_empty() {
        errors.push(ValidationError::new(format!("{}.host", field), "must not be empty"));
    }
    if proxy.non_proxy_hosts.iter().any(|h| h.trim().is_empty()) {
        errors.push(ValidationError::new(
            format!("{}.non-proxy-hosts", field),
            "must not contain empty entries",
        ));
    }
    errors
}

pub fn validate_repository(field: &str, repository: &Repository) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if repository.id.trim().is_empty() {
        errors.push(ValidationError::new(format!("{}.id", field), "must not be empty"));
    }
    if let Some(proxy) = &repository.proxy_configuration {
        errors.extend(validate_proxy(&format!("{}.proxy-configuration", field), proxy));
    }
    errors
}

pub fn validate_storage(storage: &Storage) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let field = format!("storages.{}", storage.id);
    if storage.id.trim().is_empty() {
        errors.push(ValidationError::new("storages", "storage id must not be empty"));
    }

    for (key, repository) in &storage.repositories {
        let repo_field = format!("{}.repositories.{}", field, key);
        if key != &repository.id {
            errors.push(ValidationError::new(
                &repo_field,
                format!("key does not match repository id '{}'", repository.id),
            ));
        }
        if let Some(owner) = &repository.storage_id {
            if owner != &storage.id {
                errors.push(ValidationError::new(
                    &repo_field,
                    format!("storage reference '{}' does not match containing storage", owner),
                ));
            }
        }
        errors.extend(validate_repository(&repo_field, repository));
    }
    errors
}

pub fn validate_pattern(field: &str, pattern: &str) -> Vec<ValidationError> {
    match compile_pattern(pattern) {
        Ok(_) => Vec::new(),
        Err(e) => vec![ValidationError::new(
            field,
            format!("invalid pattern '{}': {}", pattern, e),
        )],
    }
}

pub fn validate_rule_set(field: &str, rule_set: &RuleSet) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if rule_set.group_repository.trim().is_empty() {
        errors.push(ValidationError::new(
            format!("{}.group-repository", field),
            "must not be empty",
        ));
    }
    for (i, rule) in rule_set.rules.iter().enumerate() {
        errors.extend(validate_pattern(&format!("{}.rule[{}].pattern", field, i), &rule.pattern));
    }
    errors
}

/// Validate a complete configuration document.
pub fn validate_configuration(config: &Configuration) -> Result<(), Vec<ValidationError>> {
    let mut errors = validate_base_url(&config.base_url);

    if let Some(proxy) = &config.proxy_configuration {
        errors.extend(validate_proxy("proxy-configuration", proxy));
    }

    for (key, storage) in &config.storages {
        if key != &storage.id {
            errors.push(ValidationError::new(
                format!("storages.{}", key),
                format!("key does not match storage id '{}'", storage.id),
            ));
        }
        errors.extend(validate_storage(storage));
    }

    for (kind, sets) in [
        ("accepted", &config.routing_rules.accepted),
        ("denied", &config.routing_rules.denied),
    ] {
        for (key, rule_set) in sets {
            let field = format!("routing-rules.{}.{}", kind, key);
            if key != &rule_set.group_repository {
                errors.push(ValidationError::new(
                    &field,
                    format!("key does not match group repository '{}'", rule_set.group_repository),
                ));
            }
            errors.extend(validate_rule_set(&field, rule_set));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
