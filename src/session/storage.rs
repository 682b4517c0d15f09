use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Persistent string key/value storage scoped to one console installation
pub trait KeyValueStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// Write several entries; either all land or none do.
    ///
    /// The default writes one by one and restores earlier values when a later
    /// write fails.
    fn set_items(&self, items: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut written: Vec<(&str, Option<String>)> = Vec::with_capacity(items.len());
        for &(key, value) in items {
            let previous = self.get_item(key);
            if let Err(e) = self.set_item(key, value) {
                for (key, previous) in written.into_iter().rev() {
                    let restored = match previous {
                        Some(value) => self.set_item(key, &value),
                        None => self.remove_item(key),
                    };
                    if let Err(restore_err) = restored {
                        tracing::error!("Failed to restore '{}' after a partial write: {}", key, restore_err);
                    }
                }
                return Err(e);
            }
            written.push((key, previous));
        }
        Ok(())
    }
}

/// Process-local storage, used by tests and embedders without a disk
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }

    fn set_items(&self, items: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        for (key, value) in items {
            entries.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StorageFile {
    entries: HashMap<String, String>,
    updated_at: Option<DateTime<Utc>>,
}

/// JSON file backed storage surviving process restarts
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    cache: Mutex<StorageFile>,
}

impl FileStorage {
    pub const FILE_NAME: &'static str = "session.json";

    /// Open `<dir>/session.json`; an unreadable file starts empty
    pub fn open(dir: &Path) -> Self {
        let path = dir.join(Self::FILE_NAME);
        let cache = match Self::load(&path) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!("Discarding unreadable session file {}: {}", path.display(), e);
                StorageFile::default()
            }
        };

        Self {
            path,
            cache: Mutex::new(cache),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).updated_at
    }

    fn load(path: &Path) -> Result<StorageFile, StorageError> {
        if !path.exists() {
            return Ok(StorageFile::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn persist(&self, file: &mut StorageFile) -> Result<(), StorageError> {
        file.updated_at = Some(Utc::now());
        let content = serde_json::to_string_pretty(file)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, content)?;
        Ok(())
    }

    /// Apply `change` to a copy and swap it in only once it is on disk
    fn update<F>(&self, change: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut HashMap<String, String>) -> bool,
    {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        let mut next = cache.clone();
        if !change(&mut next.entries) {
            return Ok(());
        }
        self.persist(&mut next)?;
        *cache = next;
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.entries.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.update(|entries| entries.remove(key).is_some())
    }

    fn set_items(&self, items: &[(&str, &str)]) -> Result<(), StorageError> {
        self.update(|entries| {
            for (key, value) in items {
                entries.insert(key.to_string(), value.to_string());
            }
            true
        })
    }
}
