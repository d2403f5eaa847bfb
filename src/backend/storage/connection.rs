//! # Diary Connection
//!
//! Resolves the diary data directory and checks once, at startup, that it is
//! actually writable. The check is rough (create the directory, write and
//! remove a scratch file) but failing it means no storage call can be
//! expected to work, so the app gives up on persistence for the session.

use std::fs;
use std::path::{Path, PathBuf};

use directories::UserDirs;
use log::{info, warn};
use thiserror::Error;

/// Directory name under the user's Documents folder.
pub const DATA_DIR_NAME: &str = "My Diary";

const PROBE_FILE_NAME: &str = ".diary_probe";

/// Raised when the startup capability probe fails. Fatal for the session:
/// the app renders a fixed error view and attempts no storage operation.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("local storage is not available: {reason}")]
    Unavailable { reason: String },
}

/// DiaryConnection manages the base directory all entry files live in.
#[derive(Clone)]
pub struct DiaryConnection {
    base_directory: PathBuf,
}

impl DiaryConnection {
    /// Open a connection to the given base directory, creating and probing it.
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self, StorageError> {
        let base_path = base_directory.as_ref().to_path_buf();

        if let Err(e) = fs::create_dir_all(&base_path) {
            return Err(StorageError::Unavailable {
                reason: format!("cannot create {}: {}", base_path.display(), e),
            });
        }

        if let Err(e) = Self::probe(&base_path) {
            return Err(StorageError::Unavailable {
                reason: format!("cannot write to {}: {}", base_path.display(), e),
            });
        }

        Ok(Self {
            base_directory: base_path,
        })
    }

    /// Open a connection in the default data directory,
    /// `~/Documents/My Diary` (home directory when Documents is missing).
    pub fn new_default() -> Result<Self, StorageError> {
        let user_dirs = UserDirs::new().ok_or_else(|| StorageError::Unavailable {
            reason: "could not determine the user's home directory".to_string(),
        })?;

        let parent = match user_dirs.document_dir() {
            Some(documents) => documents.to_path_buf(),
            None => {
                warn!("No Documents directory found, falling back to home directory");
                user_dirs.home_dir().to_path_buf()
            }
        };

        let data_dir = parent.join(DATA_DIR_NAME);
        info!("Using data directory: {}", data_dir.display());
        Self::new(data_dir)
    }

    /// Write-and-remove a scratch file to verify the directory is writable.
    fn probe(dir: &Path) -> std::io::Result<()> {
        let probe_path = dir.join(PROBE_FILE_NAME);
        fs::write(&probe_path, b"probe")?;
        fs::remove_file(&probe_path)
    }

    /// The directory entry files are stored in.
    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Path of the file backing the given entry key.
    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.base_directory.join(key)
    }
}
