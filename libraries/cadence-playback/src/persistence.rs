//! Key-value persistence port
//!
//! The player persists a single snapshot blob under a configurable key. Any
//! store that can get and set strings by key satisfies the contract; two are
//! provided here, an in-memory map and a directory of files.

use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

use crate::error::{PlaybackError, Result};
use crate::snapshot::Snapshot;

/// String key-value store
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`; deleting a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries().remove(key);
        Ok(())
    }
}

/// File-backed store, one `<key>.json` file per key
///
/// Writes go to a temporary file that is renamed over the target, so a crash
/// mid-write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        debug!(dir = %dir.display(), "Opened file store");
        Ok(Self { dir })
    }

    /// Directory holding the files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() {
            return Err(PlaybackError::Persistence("empty key".to_string()));
        }

        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        Ok(self.dir.join(format!("{name}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");

        let mut file = fs::File::create(&tmp)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Snapshot persistence on top of a key-value store
///
/// Skips writes when the snapshot equals the last one saved.
#[derive(Debug)]
pub struct SnapshotStore<S> {
    store: S,
    key: String,
    last_saved: Option<Snapshot>,
}

impl<S: KeyValueStore> SnapshotStore<S> {
    /// Persist snapshots in `store` under `key`
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            last_saved: None,
        }
    }

    /// Underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load the persisted snapshot
    ///
    /// Returns `None` when nothing was saved or the store cannot be read.
    /// A stored blob is decoded leniently against `defaults`.
    pub fn load_snapshot(&mut self, defaults: &Snapshot) -> Option<Snapshot> {
        let blob = match self.store.get(&self.key) {
            Ok(Some(blob)) => blob,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %self.key, "Failed to read player snapshot: {}", e);
                return None;
            }
        };

        let snapshot = Snapshot::decode(&blob, defaults);
        self.last_saved = Some(snapshot.clone());
        Some(snapshot)
    }

    /// Persist `snapshot` unless it matches the last saved one
    ///
    /// Returns `Ok(true)` when a write happened.
    pub fn save_snapshot(&mut self, snapshot: &Snapshot) -> Result<bool> {
        if self.last_saved.as_ref() == Some(snapshot) {
            return Ok(false);
        }

        let blob = snapshot.encode()?;
        self.store.set(&self.key, &blob)?;
        self.last_saved = Some(snapshot.clone());
        Ok(true)
    }

    /// Delete the persisted snapshot
    pub fn clear(&mut self) -> Result<()> {
        self.last_saved = None;
        self.store.remove(&self.key)
    }
}
