//! # Storage Layer
//!
//! The key-value contract entries persist through, the file-per-key
//! implementation behind it, and the data-directory connection that probes
//! storage availability once at startup.

pub mod connection;
pub mod file_store;

pub use connection::{DiaryConnection, StorageError};
pub use file_store::FileEntryStore;
#[cfg(test)]
pub use file_store::MemoryEntryStore;

use anyhow::Result;

/// Synchronous string key-value store for serialized diary items.
///
/// This abstracts the storage backend away from the UI layer. All operations
/// are synchronous: the app is a single-threaded desktop program and no store
/// call is allowed to block for long.
pub trait EntryStore: Send + Sync {
    /// Fetch the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, overwriting any existing value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key succeeds and does nothing.
    fn remove(&self, key: &str) -> Result<()>;

    /// All keys currently stored, in no particular order.
    fn keys(&self) -> Result<Vec<String>>;
}
