//! In-memory vault that records every call, for ordering assertions.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Result, SharkError};

use super::{EntryKind, FileTimestamps, Vault, VaultEntry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultCall {
    ListFolder(PathBuf),
    CreateFolder(PathBuf),
    DeleteStarted(PathBuf),
    DeleteFinished(PathBuf),
    CreateFile(PathBuf),
}

#[derive(Debug, Default)]
struct State {
    folders: BTreeSet<PathBuf>,
    files: BTreeMap<PathBuf, (String, FileTimestamps)>,
    calls: Vec<VaultCall>,
}

#[derive(Debug, Default)]
pub struct MemoryVault {
    state: Mutex<State>,
    fail_delete: HashSet<PathBuf>,
    fail_create_folder: bool,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_folder(self, path: &str) -> Self {
        self.state.lock().unwrap().folders.insert(PathBuf::from(path));
        self
    }

    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.state.lock().unwrap().files.insert(
            PathBuf::from(path),
            (content.to_string(), FileTimestamps { created: 0, modified: 0 }),
        );
        self
    }

    pub fn failing_delete(mut self, path: &str) -> Self {
        self.fail_delete.insert(PathBuf::from(path));
        self
    }

    pub fn failing_create_folder(mut self) -> Self {
        self.fail_create_folder = true;
        self
    }

    pub fn calls(&self) -> Vec<VaultCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn file(&self, path: &str) -> Option<(String, FileTimestamps)> {
        self.state.lock().unwrap().files.get(Path::new(path)).cloned()
    }

    pub fn file_paths(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().files.keys().cloned().collect()
    }

    pub fn has_folder(&self, path: &str) -> bool {
        self.state.lock().unwrap().folders.contains(Path::new(path))
    }

    fn record(&self, call: VaultCall) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl Vault for MemoryVault {
    async fn folder_children(&self, folder: &Path) -> Result<Option<Vec<VaultEntry>>> {
        self.record(VaultCall::ListFolder(folder.to_path_buf()));
        let state = self.state.lock().unwrap();
        if !state.folders.contains(folder) {
            return Ok(None);
        }

        let folders = state
            .folders
            .iter()
            .filter(|p| p.parent() == Some(folder))
            .map(|p| VaultEntry {
                path: p.clone(),
                kind: EntryKind::Folder,
            });
        let files = state
            .files
            .keys()
            .filter(|p| p.parent() == Some(folder))
            .map(|p| VaultEntry {
                path: p.clone(),
                kind: EntryKind::File,
            });

        Ok(Some(folders.chain(files).collect()))
    }

    async fn create_folder(&self, folder: &Path) -> Result<()> {
        self.record(VaultCall::CreateFolder(folder.to_path_buf()));
        if self.fail_create_folder {
            return Err(SharkError::Io(std::io::Error::other("read-only vault")));
        }
        self.state.lock().unwrap().folders.insert(folder.to_path_buf());
        Ok(())
    }

    async fn delete(&self, entry: &VaultEntry) -> Result<()> {
        self.record(VaultCall::DeleteStarted(entry.path.clone()));
        // Let other deletions start before this one finishes
        tokio::task::yield_now().await;

        if self.fail_delete.contains(&entry.path) {
            self.record(VaultCall::DeleteFinished(entry.path.clone()));
            return Err(SharkError::Io(std::io::Error::other("permission denied")));
        }

        {
            let mut state = self.state.lock().unwrap();
            state.files.retain(|p, _| !p.starts_with(&entry.path));
            state.folders.retain(|p| !p.starts_with(&entry.path));
            state.calls.push(VaultCall::DeleteFinished(entry.path.clone()));
        }
        Ok(())
    }

    async fn create_file(&self, path: &Path, content: &str, times: FileTimestamps) -> Result<()> {
        self.record(VaultCall::CreateFile(path.to_path_buf()));
        let mut state = self.state.lock().unwrap();
        if state.files.contains_key(path) {
            return Err(SharkError::Io(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "file already exists",
            )));
        }
        state
            .files
            .insert(path.to_path_buf(), (content.to_string(), times));
        Ok(())
    }
}
