use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use snafu::{OptionExt, ResultExt};

use super::KeyValueStore;
use super::error::{
    CreateDirSnafu, ReadFileSnafu, RenameTempFileSnafu, SerializeEntriesSnafu, StorageResult,
    WriteFileSnafu, WriteLockPoisonedSnafu,
};

/// JSON-file backed store.
///
/// Reads are served from the last persisted snapshot. Every write replaces the
/// whole file through a temporary sibling and a rename, so a crash mid-write
/// leaves the previous contents in place.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: ArcSwap<BTreeMap<String, String>>,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Opens the store at `path`. A missing file starts empty; an unreadable
    /// JSON payload is discarded with a warning.
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        let entries = Self::load_from_disk(&path)?;

        Ok(Self {
            path,
            entries: ArcSwap::from_pointee(entries),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_disk(path: &Path) -> StorageResult<BTreeMap<String, String>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                tracing::info!("storage file not found at {:?}, starting empty", path);
                return Ok(BTreeMap::new());
            }
            Err(error) => {
                return Err(error).context(ReadFileSnafu {
                    stage: "read-storage-file",
                    path: path.to_path_buf(),
                });
            }
        };

        match serde_json::from_str::<BTreeMap<String, String>>(&content) {
            Ok(entries) => Ok(entries),
            Err(error) => {
                tracing::warn!(
                    "failed to parse storage file {:?}: {}. starting empty",
                    path,
                    error
                );
                Ok(BTreeMap::new())
            }
        }
    }

    fn mutate<F>(&self, stage: &'static str, apply: F) -> StorageResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self
            .write_lock
            .lock()
            .ok()
            .context(WriteLockPoisonedSnafu { stage })?;

        let mut next = BTreeMap::clone(&self.entries.load());
        apply(&mut next);
        self.persist(&next)?;
        self.entries.store(Arc::new(next));
        Ok(())
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).context(CreateDirSnafu {
                stage: "create-storage-directory",
                path: parent.to_path_buf(),
            })?;
        }

        let content = serde_json::to_string_pretty(entries).context(SerializeEntriesSnafu {
            stage: "serialize-storage-json",
        })?;

        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, content).context(WriteFileSnafu {
            stage: "write-temporary-storage-file",
            path: temp_path.clone(),
        })?;

        std::fs::rename(&temp_path, &self.path).context(RenameTempFileSnafu {
            stage: "rename-temporary-storage-file",
            from: temp_path,
            to: self.path.clone(),
        })?;

        tracing::debug!("saved {} storage entries to {:?}", entries.len(), self.path);
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.load().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.mutate("set-storage-entry", |entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        if self.entries.load().get(key).is_none() {
            return Ok(());
        }

        self.mutate("remove-storage-entry", |entries| {
            entries.remove(key);
        })
    }
}
