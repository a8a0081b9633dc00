//! Retained-state checks guarding non-forced deletions.

use std::fs;
use std::path::PathBuf;

use crate::model::Repository;

/// Answers whether a repository still holds state that a plain delete
/// would discard.
pub trait RetentionProbe: Send + Sync {
    fn has_retained_state(&self, repository: &Repository) -> bool;
}

impl<F> RetentionProbe for F
where
    F: Fn(&Repository) -> bool + Send + Sync,
{
    fn has_retained_state(&self, repository: &Repository) -> bool {
        self(repository)
    }
}

/// Never reports retained state.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRetention;

impl RetentionProbe for NoRetention {
    fn has_retained_state(&self, _repository: &Repository) -> bool {
        false
    }
}

/// Reports retained state when a trash-enabled repository has a non-empty
/// `<vault>/storages/<storage>/<repository>/.trash` directory.
#[derive(Debug, Clone)]
pub struct TrashDirectoryProbe {
    vault: PathBuf,
}

impl TrashDirectoryProbe {
    pub fn new(vault: impl Into<PathBuf>) -> Self {
        Self { vault: vault.into() }
    }

    pub fn trash_dir(&self, storage_id: &str, repository_id: &str) -> PathBuf {
        self.vault
            .join("storages")
            .join(storage_id)
            .join(repository_id)
            .join(".trash")
    }
}

impl RetentionProbe for TrashDirectoryProbe {
    fn has_retained_state(&self, repository: &Repository) -> bool {
        if !repository.trash_enabled {
            return false;
        }
        let Some(storage_id) = repository.storage_id.as_deref() else {
            return false;
        };

        let dir = self.trash_dir(storage_id, &repository.id);
        match fs::read_dir(&dir) {
            Ok(mut entries) => entries.next().is_some(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trash_repository() -> Repository {
        let mut repo = Repository::new("releases-with-trash").in_storage("storage0");
        repo.trash_enabled = true;
        repo
    }

    #[test]
    fn test_empty_or_missing_trash_is_not_retained() {
        let vault = tempfile::tempdir().unwrap();
        let probe = TrashDirectoryProbe::new(vault.path());
        let repo = trash_repository();
        assert!(!probe.has_retained_state(&repo));

        fs::create_dir_all(probe.trash_dir("storage0", &repo.id)).unwrap();
        assert!(!probe.has_retained_state(&repo));
    }

    #[test]
    fn test_trash_contents_are_retained() {
        let vault = tempfile::tempdir().unwrap();
        let probe = TrashDirectoryProbe::new(vault.path());
        let mut repo = trash_repository();

        let dir = probe.trash_dir("storage0", &repo.id);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("artifact.jar"), b"jar").unwrap();
        assert!(probe.has_retained_state(&repo));

        repo.trash_enabled = false;
        assert!(!probe.has_retained_state(&repo));
    }

    #[test]
    fn test_closure_probe() {
        let probe = |r: &Repository| r.id == "keep";
        assert!(probe.has_retained_state(&Repository::new("keep")));
        assert!(!NoRetention.has_retained_state(&Repository::new("keep")));
    }
}
