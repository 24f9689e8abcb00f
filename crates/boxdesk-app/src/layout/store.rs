//! Persistent local key-value storage backing the layout store

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use boxdesk_core::prelude::*;
use fs2::FileExt;

/// String key-value storage
///
/// Writes are full overwrites of a single key; there is no merging.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// One JSON file per key under a state directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(Error::storage(
                &self.dir,
                format!("Invalid storage key: {:?}", key),
            ));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::storage(&path, e.to_string())),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| Error::storage(&self.dir, format!("Failed to create directory: {}", e)))?;

        // Serializes writers across processes sharing the state dir
        let lock_path = self.dir.join(format!(".{}.lock", key));
        let lock = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| Error::storage(&lock_path, format!("Failed to open lock: {}", e)))?;
        lock.lock_exclusive()
            .map_err(|e| Error::storage(&lock_path, format!("Failed to lock: {}", e)))?;

        let temp_path = self.dir.join(format!(".{}.json.tmp", key));
        let mut temp = std::fs::File::create(&temp_path)
            .map_err(|e| Error::storage(&temp_path, format!("Failed to create temp file: {}", e)))?;
        temp.write_all(value.as_bytes())
            .and_then(|_| temp.flush())
            .map_err(|e| Error::storage(&temp_path, format!("Failed to write temp file: {}", e)))?;
        drop(temp);

        std::fs::rename(&temp_path, &path)
            .map_err(|e| Error::storage(&path, format!("Failed to rename temp file: {}", e)))?;

        // Lock released when `lock` drops
        trace!("Stored {} bytes under {:?}", value.len(), path);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::storage(&path, e.to_string())),
        }
    }
}

/// In-memory store for tests and embedders without a filesystem
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}
