//! Storage entity.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::repository::Repository;

/// Named container that exclusively owns its repositories.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Storage {
    pub id: String,

    /// Repositories keyed by repository id.
    #[serde(default)]
    pub repositories: BTreeMap<String, Repository>,
}

impl Storage {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            repositories: BTreeMap::new(),
        }
    }

    pub fn repository(&self, id: &str) -> Option<&Repository> {
        self.repositories.get(id)
    }

    /// Insert or replace a repository, pointing it back at this storage.
    pub fn put_repository(&mut self, mut repository: Repository) -> Option<Repository> {
        repository.storage_id = Some(self.id.clone());
        self.repositories.insert(repository.id.clone(), repository)
    }

    pub fn remove_repository(&mut self, id: &str) -> Option<Repository> {
        self.repositories.remove(id)
    }

    /// Point every contained repository back at this storage.
    pub fn normalize_back_references(&mut self) {
        for repository in self.repositories.values_mut() {
            repository.storage_id = Some(self.id.clone());
        }
    }
}
