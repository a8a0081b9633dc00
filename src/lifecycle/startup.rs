//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the persistence store and retention probe from settings
//! - Open the configuration manager (load or write defaults)
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently

use std::sync::Arc;

use crate::config::Settings;
use crate::error::Result;
use crate::manager::{ConfigurationManager, FileStore, TrashDirectoryProbe};

/// Open the manager described by `settings`.
pub fn open_manager(settings: &Settings) -> Result<Arc<ConfigurationManager>> {
    let store = Arc::new(FileStore::new(&settings.store.path));
    let probe = Arc::new(TrashDirectoryProbe::new(&settings.vault.directory));

    let manager = ConfigurationManager::open(store)?.with_retention_probe(probe);
    tracing::debug!(
        store = %settings.store.path,
        vault = %settings.vault.directory,
        "Configuration manager ready"
    );
    Ok(Arc::new(manager))
}
