//! Settings schema for the `strongbox-config` binary.
//!
//! These are the service's own settings (where the configuration document
//! lives, logging, watching), read from a TOML file. The managed
//! configuration document itself is described in [`crate::model`].

use serde::{Deserialize, Serialize};

/// Root settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Persisted configuration document.
    pub store: StoreSettings,

    /// Vault layout used to detect retained repository state.
    pub vault: VaultSettings,

    /// Observability settings.
    pub observability: ObservabilitySettings,

    /// Hot reload of the configuration document.
    pub watch: WatchSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Path of the JSON configuration document.
    pub path: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: "etc/conf/strongbox.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VaultSettings {
    /// Root directory holding `storages/<storage>/<repository>`.
    pub directory: String,
}

impl Default for VaultSettings {
    fn default() -> Self {
        Self {
            directory: "strongbox-vault".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilitySettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Prometheus endpoint bind address; disabled when unset.
    pub metrics_address: Option<String>,
}

impl Default for ObservabilitySettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_address: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WatchSettings {
    /// Reload the document when it changes on disk.
    pub enabled: bool,

    /// Poll interval for platforms without native file events.
    pub poll_interval_secs: u64,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_secs: 2,
        }
    }
}
