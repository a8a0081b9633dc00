//! Durable persistence of the configuration document.

use parking_lot::Mutex;
use std::fs;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::StoreError;
use crate::model::Configuration;

/// Where the configuration document lives.
pub trait ConfigurationStore: Send + Sync + std::fmt::Debug {
    /// Read the persisted document. `Ok(None)` when nothing was persisted yet.
    fn load(&self) -> Result<Option<Configuration>, StoreError>;

    /// Durably write the document. Must not return before the write is complete.
    fn save(&self, config: &Configuration) -> Result<(), StoreError>;
}

/// JSON document on the local filesystem.
///
/// Writes go to a sibling temporary file which is synced and renamed over
/// the target, so readers never see a half-written document.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ConfigurationStore for FileStore {
    fn load(&self) -> Result<Option<Configuration>, StoreError> {
        let file = match fs::File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let config = serde_json::from_reader(BufReader::new(file))?;
        Ok(Some(config))
    }

    fn save(&self, config: &Configuration) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.temp_path();
        {
            let file = fs::File::create(&tmp)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, config)?;
            writer.write_all(b"\n")?;
            let file = writer.into_inner().map_err(|e| e.into_error())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;

        tracing::debug!(path = ?self.path, "Configuration document written");
        Ok(())
    }
}

/// In-memory store holding the encoded document.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<Option<String>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with an already persisted configuration.
    pub fn with_configuration(config: &Configuration) -> Result<Self, StoreError> {
        let store = Self::new();
        store.save(config)?;
        Ok(store)
    }

    /// Make every following `save` fail with an I/O error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn document(&self) -> Option<String> {
        self.document.lock().clone()
    }
}

impl ConfigurationStore for MemoryStore {
    fn load(&self) -> Result<Option<Configuration>, StoreError> {
        match self.document.lock().as_deref() {
            Some(doc) => Ok(Some(serde_json::from_str(doc)?)),
            None => Ok(None),
        }
    }

    fn save(&self, config: &Configuration) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(std::io::Error::new(ErrorKind::Other, "writes disabled").into());
        }
        let doc = serde_json::to_string(config)?;
        *self.document.lock() = Some(doc);
        Ok(())
    }
}
