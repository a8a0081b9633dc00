//! Configuration document watcher for hot reload.

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

/// A watcher that reports changes to the configuration document.
///
/// The parent directory is watched rather than the file itself, because the
/// file store replaces the document by renaming a temporary file over it.
pub struct ConfigWatcher {
    path: PathBuf,
    poll_interval: Duration,
    change_tx: mpsc::UnboundedSender<PathBuf>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver of change notifications.
    pub fn new(path: &Path, poll_interval: Duration) -> (Self, mpsc::UnboundedReceiver<PathBuf>) {
        let (change_tx, change_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                poll_interval,
                change_tx,
            },
            change_rx,
        )
    }

    /// Start watching in a background thread. Dropping the returned
    /// watcher stops it.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.change_tx.clone();
        let target = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let relevant = (event.kind.is_modify() || event.kind.is_create())
                        && event.paths.iter().any(|p| is_target(p, &target));
                    if relevant {
                        tracing::debug!(path = ?target, kind = ?event.kind, "Configuration document changed");
                        let _ = tx.send(target.clone());
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(self.poll_interval),
        )?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Configuration watcher started");
        Ok(watcher)
    }
}

fn is_target(candidate: &Path, target: &Path) -> bool {
    candidate == target || (candidate.file_name().is_some() && candidate.file_name() == target.file_name())
}
