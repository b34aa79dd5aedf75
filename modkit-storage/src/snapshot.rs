//! JSON snapshot persistence for the in-memory store.
//!
//! A snapshot file is the whole store for a command-line run. Writers that
//! load, modify and save a snapshot hold [`SnapshotLock`] for the entire
//! cycle so two runs against one file serialize the same way two
//! transactions on one [`InMemoryStore`] do.

use crate::{InMemoryStore, Tables};
use modkit_core::StoreError;
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Exclusive advisory lock on a snapshot. Released when dropped.
#[derive(Debug)]
pub struct SnapshotLock {
    _file: File,
    path: PathBuf,
}

impl SnapshotLock {
    /// The sidecar file carrying the lock.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Sidecar lock file for the snapshot at `path`: `store.json` locks
/// through `store.json.lock`.
pub fn lock_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}

/// Block until this process holds the exclusive lock on `path`.
pub fn lock(path: &Path) -> Result<SnapshotLock, SnapshotError> {
    create_parent(path)?;
    let lock_path = lock_path(path);
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock_path)?;
    file.lock()?;
    tracing::debug!(path = %lock_path.display(), "snapshot lock acquired");
    Ok(SnapshotLock {
        _file: file,
        path: lock_path,
    })
}

/// Load a store from `path`. A missing file yields an empty store.
pub fn load(path: &Path) -> Result<InMemoryStore, SnapshotError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no snapshot found, starting empty");
        return Ok(InMemoryStore::new());
    }
    let contents = std::fs::read_to_string(path)?;
    let tables = serde_json::from_str::<Tables>(&contents)?;
    Ok(InMemoryStore::from_tables(tables))
}

/// Write the committed contents of `store` to `path`.
///
/// The snapshot is written to a temporary file in the same directory and
/// renamed over `path`, so a reader sees either the old or the new file.
pub fn save(path: &Path, store: &InMemoryStore) -> Result<(), SnapshotError> {
    let dir = create_parent(path)?;
    let tables = store.tables()?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, &tables)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    tracing::debug!(path = %path.display(), "snapshot written");
    Ok(())
}

fn create_parent(path: &Path) -> Result<&Path, SnapshotError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EntityStore, StoreQueries, Transaction, TransactionalStore};
    use modkit_core::{EntityKind, NewIssueStatus, NewRole};

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = load(&dir.path().join("absent.json")).unwrap();
        assert!(!store.exists(EntityKind::Role).unwrap());
    }

    #[test]
    fn test_save_then_load_preserves_rows_and_sequences() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = InMemoryStore::new();
        let mut tx = store.begin().unwrap();
        tx.create_role(NewRole::new("Admin", 1)).unwrap();
        tx.create_status(NewIssueStatus {
            name: "New".to_string(),
            is_closed: false,
            position: 1,
        })
        .unwrap();
        tx.commit().unwrap();
        save(&path, &store).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.tables().unwrap(), store.tables().unwrap());

        let mut tx = loaded.begin().unwrap();
        let second = tx.create_role(NewRole::new("Moderator", 2)).unwrap();
        assert_eq!(second.id.to_string(), "2");
    }

    #[test]
    fn test_save_replaces_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "stale").unwrap();

        let store = InMemoryStore::new();
        let mut tx = store.begin().unwrap();
        tx.create_role(NewRole::new("Admin", 1)).unwrap();
        tx.commit().unwrap();
        save(&path, &store).unwrap();

        assert_eq!(load(&path).unwrap().tables().unwrap(), store.tables().unwrap());
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![OsString::from("store.json")]);
    }

    #[test]
    fn test_lock_is_exclusive_until_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let guard = lock(&path).unwrap();
        assert_eq!(guard.path(), lock_path(&path));
        let other = OpenOptions::new().write(true).open(lock_path(&path)).unwrap();
        assert!(other.try_lock().is_err());

        drop(guard);
        assert!(other.try_lock().is_ok());
    }

    #[test]
    fn test_lock_path_is_a_sidecar() {
        assert_eq!(
            lock_path(Path::new("data/store.json")),
            PathBuf::from("data/store.json.lock")
        );
    }

    #[test]
    fn test_load_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(load(&path), Err(SnapshotError::Serde(_))));
    }
}
