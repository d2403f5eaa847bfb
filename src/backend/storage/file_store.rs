//! # File-Backed Entry Store
//!
//! One file per key inside the diary data directory:
//!
//! ```text
//! My Diary/
//! ├── diary1756110134000    ← serialized item, file name = store key
//! ├── diary1756110201558
//! └── ...
//! ```
//!
//! Enumeration order is whatever the filesystem reports; callers that need
//! creation order sort the keys themselves.

use std::fs;
use std::io;

use anyhow::Result;
use log::debug;

use super::connection::DiaryConnection;
use super::EntryStore;

/// Entry store that persists each key as a file under the connection's
/// base directory.
pub struct FileEntryStore {
    connection: DiaryConnection,
}

impl FileEntryStore {
    pub fn new(connection: DiaryConnection) -> Self {
        Self { connection }
    }
}

impl EntryStore for FileEntryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.connection.entry_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::write(self.connection.entry_path(key), value)?;
        debug!("Stored {} ({} bytes)", key, value.len());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.connection.entry_path(key)) {
            Ok(()) => {
                debug!("Removed {}", key);
                Ok(())
            }
            // Removing an absent key is a no-op
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for dir_entry in fs::read_dir(self.connection.base_directory())? {
            let dir_entry = dir_entry?;
            if !dir_entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = dir_entry.file_name().to_str() {
                // Skip dotfiles (OS metadata, probe leftovers)
                if name.starts_with('.') {
                    continue;
                }
                keys.push(name.to_string());
            }
        }
        Ok(keys)
    }
}

/// In-memory entry store for tests that need no filesystem.
#[cfg(test)]
pub struct MemoryEntryStore {
    entries: std::sync::Mutex<std::collections::BTreeMap<String, String>>,
}

#[cfg(test)]
impl MemoryEntryStore {
    pub fn new() -> Self {
        Self {
            entries: std::sync::Mutex::new(std::collections::BTreeMap::new()),
        }
    }
}

#[cfg(test)]
impl EntryStore for MemoryEntryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.lock().unwrap().keys().cloned().collect())
    }
}
