//! # Backend
//!
//! Storage side of the diary: the domain model (items, codec, key scheme)
//! and the persistent key-value store the UI layer writes entries to.
//!
//! The UI never touches `std::fs` directly; everything goes through the
//! [`Backend`] facade created once at startup.

pub mod domain;
pub mod storage;

use log::info;

use storage::{DiaryConnection, EntryStore, FileEntryStore, StorageError};

/// Backend connection for entry persistence.
///
/// Construction performs the one-time capability probe; if it fails the app
/// runs without a backend for the rest of the session and must not attempt
/// any storage operation.
pub struct Backend {
    store: Box<dyn EntryStore>,
}

impl Backend {
    /// Open the store in the default data directory, probing it first.
    pub fn new() -> Result<Self, StorageError> {
        let connection = DiaryConnection::new_default()?;
        info!("Diary data directory: {}", connection.base_directory().display());
        Ok(Self {
            store: Box::new(FileEntryStore::new(connection)),
        })
    }

    /// Access the key-value store.
    pub fn store(&self) -> &dyn EntryStore {
        self.store.as_ref()
    }

    /// Backend over an explicit directory.
    #[cfg(test)]
    pub fn with_connection(connection: DiaryConnection) -> Self {
        Self {
            store: Box::new(FileEntryStore::new(connection)),
        }
    }

    /// Backend over an in-memory store, for tests that need no filesystem.
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self {
            store: Box::new(storage::MemoryEntryStore::new()),
        }
    }
}
