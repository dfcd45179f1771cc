//! Storage the sync folder lives in.
//!
//! Paths handed to a [`Vault`] are relative to its root.

mod local;
#[cfg(test)]
pub(crate) mod memory;

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;

use crate::error::Result;

pub use self::local::FsVault;

/// Epoch values at or above this are milliseconds, below are seconds.
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Folder,
}

/// A direct child of a folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
}

/// Creation and modification times for a new file, as raw epoch values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileTimestamps {
    pub created: i64,
    pub modified: i64,
}

impl FileTimestamps {
    pub fn created_time(&self) -> Option<SystemTime> {
        epoch_to_system_time(self.created)
    }

    pub fn modified_time(&self) -> Option<SystemTime> {
        epoch_to_system_time(self.modified)
    }
}

/// Interpret an epoch value of unknown unit. Non-positive values have no time.
pub fn epoch_to_system_time(value: i64) -> Option<SystemTime> {
    if value <= 0 {
        return None;
    }
    let value = value as u64;
    let offset = if value >= MILLIS_THRESHOLD as u64 {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    };
    UNIX_EPOCH.checked_add(offset)
}

#[async_trait]
pub trait Vault: Send + Sync {
    /// Children of `folder`, or `None` if the folder does not exist.
    async fn folder_children(&self, folder: &Path) -> Result<Option<Vec<VaultEntry>>>;

    async fn create_folder(&self, folder: &Path) -> Result<()>;

    /// Remove a file, or a folder with everything in it.
    async fn delete(&self, entry: &VaultEntry) -> Result<()>;

    /// Create a new file. Fails if something already exists at `path`.
    async fn create_file(&self, path: &Path, content: &str, times: FileTimestamps) -> Result<()>;
}
