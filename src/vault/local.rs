//! Vault backed by a directory on the local disk.

use std::fs::{File, FileTimes, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{Result, SharkError};

use super::{EntryKind, FileTimestamps, Vault, VaultEntry};

pub struct FsVault {
    root: PathBuf,
}

impl FsVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn absolute(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }
}

#[async_trait]
impl Vault for FsVault {
    async fn folder_children(&self, folder: &Path) -> Result<Option<Vec<VaultEntry>>> {
        let dir = self.absolute(folder);
        match tokio::fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(SharkError::FolderCreate {
                    path: folder.to_path_buf(),
                    reason: "a file with that name already exists".to_string(),
                })
            }
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        }

        let mut children = Vec::new();
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            // file_type() does not follow symlinks, so a linked folder is
            // removed as a link and its target is left alone
            let kind = if entry.file_type().await?.is_dir() {
                EntryKind::Folder
            } else {
                EntryKind::File
            };
            children.push(VaultEntry {
                path: folder.join(entry.file_name()),
                kind,
            });
        }
        children.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(Some(children))
    }

    async fn create_folder(&self, folder: &Path) -> Result<()> {
        tokio::fs::create_dir_all(self.absolute(folder)).await?;
        Ok(())
    }

    async fn delete(&self, entry: &VaultEntry) -> Result<()> {
        let path = self.absolute(&entry.path);
        match entry.kind {
            EntryKind::Folder => tokio::fs::remove_dir_all(path).await?,
            EntryKind::File => tokio::fs::remove_file(path).await?,
        }
        Ok(())
    }

    async fn create_file(&self, path: &Path, content: &str, times: FileTimestamps) -> Result<()> {
        let path = self.absolute(path);
        let content = content.to_string();
        tokio::task::spawn_blocking(move || write_new_file(&path, &content, times))
            .await
            .map_err(|e| SharkError::Io(std::io::Error::other(e.to_string())))?
    }
}

fn write_new_file(path: &Path, content: &str, times: FileTimestamps) -> Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    fill_or_discard(path, &mut file, content)?;

    // Some mounts reject explicit times; the note itself is still complete
    if let Err(e) = apply_times(&file, times) {
        tracing::warn!(path = %path.display(), error = %e, "could not set note timestamps");
    }
    Ok(())
}

/// Write `content` into a file we just created, removing it again on failure.
fn fill_or_discard(path: &Path, file: &mut File, content: &str) -> Result<()> {
    if let Err(e) = file.write_all(content.as_bytes()) {
        if let Err(remove_err) = std::fs::remove_file(path) {
            tracing::debug!(path = %path.display(), error = %remove_err, "could not remove partial note");
        }
        return Err(e.into());
    }
    Ok(())
}

fn apply_times(file: &File, times: FileTimestamps) -> Result<()> {
    let mut file_times = FileTimes::new();
    let mut any = false;

    if let Some(modified) = times.modified_time() {
        file_times = file_times.set_modified(modified).set_accessed(modified);
        any = true;
    }

    #[cfg(target_os = "macos")]
    {
        use std::os::macos::fs::FileTimesExt;
        if let Some(created) = times.created_time() {
            file_times = file_times.set_created(created);
            any = true;
        }
    }

    #[cfg(windows)]
    {
        use std::os::windows::fs::FileTimesExt;
        if let Some(created) = times.created_time() {
            file_times = file_times.set_created(created);
            any = true;
        }
    }

    if any {
        file.set_times(file_times)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};
    use tempfile::TempDir;

    fn times(created: i64, modified: i64) -> FileTimestamps {
        FileTimestamps { created, modified }
    }

    #[tokio::test]
    async fn test_missing_folder_is_none() {
        let tmp = TempDir::new().unwrap();
        let vault = FsVault::new(tmp.path());
        assert!(vault
            .folder_children(Path::new("nope"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_folder_children_lists_files_and_folders() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("notes/sub")).unwrap();
        std::fs::write(tmp.path().join("notes/a.md"), "a").unwrap();

        let vault = FsVault::new(tmp.path());
        let children = vault
            .folder_children(Path::new("notes"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            children,
            vec![
                VaultEntry {
                    path: PathBuf::from("notes/a.md"),
                    kind: EntryKind::File
                },
                VaultEntry {
                    path: PathBuf::from("notes/sub"),
                    kind: EntryKind::Folder
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_folder_path_is_a_file() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("notes"), "oops").unwrap();
        let vault = FsVault::new(tmp.path());
        let result = vault.folder_children(Path::new("notes")).await;
        assert!(matches!(result, Err(SharkError::FolderCreate { .. })));
    }

    #[tokio::test]
    async fn test_delete_file_and_folder() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("notes/sub/deep")).unwrap();
        std::fs::write(tmp.path().join("notes/sub/deep/x.md"), "x").unwrap();
        std::fs::write(tmp.path().join("notes/a.md"), "a").unwrap();

        let vault = FsVault::new(tmp.path());
        vault
            .delete(&VaultEntry {
                path: PathBuf::from("notes/sub"),
                kind: EntryKind::Folder,
            })
            .await
            .unwrap();
        vault
            .delete(&VaultEntry {
                path: PathBuf::from("notes/a.md"),
                kind: EntryKind::File,
            })
            .await
            .unwrap();

        assert!(!tmp.path().join("notes/sub").exists());
        assert!(!tmp.path().join("notes/a.md").exists());
        assert!(tmp.path().join("notes").exists());
    }

    #[tokio::test]
    async fn test_create_file_sets_content_and_mtime() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("notes")).unwrap();
        let vault = FsVault::new(tmp.path());

        vault
            .create_file(Path::new("notes/n.md"), "body", times(1_600_000_000, 1_700_000_000))
            .await
            .unwrap();

        let path = tmp.path().join("notes/n.md");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "body");
        let modified = std::fs::metadata(&path).unwrap().modified().unwrap();
        assert_eq!(
            modified.duration_since(UNIX_EPOCH).unwrap(),
            Duration::from_secs(1_700_000_000)
        );
    }

    #[test]
    fn test_failed_write_removes_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("n.md");
        std::fs::write(&path, "").unwrap();
        // A read-only handle makes the write fail
        let mut file = File::open(&path).unwrap();

        let result = fill_or_discard(&path, &mut file, "body");

        assert!(matches!(result, Err(SharkError::Io(_))));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_create_file_without_times_keeps_file() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("notes")).unwrap();
        let vault = FsVault::new(tmp.path());

        vault
            .create_file(Path::new("notes/n.md"), "body", times(0, -5))
            .await
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(tmp.path().join("notes/n.md")).unwrap(),
            "body"
        );
    }

    #[tokio::test]
    async fn test_create_file_refuses_existing() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("notes")).unwrap();
        std::fs::write(tmp.path().join("notes/n.md"), "old").unwrap();
        let vault = FsVault::new(tmp.path());

        let result = vault
            .create_file(Path::new("notes/n.md"), "new", times(1, 2))
            .await;
        assert!(result.is_err());
        assert_eq!(
            std::fs::read_to_string(tmp.path().join("notes/n.md")).unwrap(),
            "old"
        );
    }
}
