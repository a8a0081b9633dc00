//! Repository entity.

use serde::{Deserialize, Serialize};

use crate::model::proxy::ProxyConfiguration;

/// A named artifact collection inside a storage.
///
/// The owning storage is held as its id, not as a live reference, and is
/// resolved through the manager when the repository is registered.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Repository {
    pub id: String,

    #[serde(rename = "storage", default, skip_serializing_if = "Option::is_none")]
    pub storage_id: Option<String>,

    #[serde(default)]
    pub allows_redeployment: bool,

    #[serde(default)]
    pub allows_force_deletion: bool,

    #[serde(default)]
    pub secured: bool,

    #[serde(default)]
    pub trash_enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_configuration: Option<ProxyConfiguration>,
}

impl Repository {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Attach the repository to a storage.
    pub fn in_storage(mut self, storage_id: impl Into<String>) -> Self {
        self.storage_id = Some(storage_id.into());
        self
    }

    /// `storage:repository` form used by routing rules.
    pub fn qualified_id(&self) -> Option<String> {
        self.storage_id
            .as_ref()
            .map(|storage| format!("{}:{}", storage, self.id))
    }
}
