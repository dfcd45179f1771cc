//! Replace the contents of the sync folder with a fresh set of documents.
//!
//! The folder is created if needed, every existing child is deleted, and
//! only then are the new files written. Deletions run concurrently with each
//! other, creations run concurrently with each other, and no creation starts
//! while a deletion is still in flight.

use std::path::{Path, PathBuf};

use futures_util::future::join_all;

use crate::error::{Result, SharkError};
use crate::notify::{Notifier, SyncEvent};
use crate::transform::ResolvedDocument;
use crate::vault::{FileTimestamps, Vault, VaultEntry};

/// What one reconcile pass did
#[derive(Debug, Default)]
pub struct ReconcileOutcome {
    pub folder_created: bool,
    pub deleted: usize,
    /// Relative paths of the files written
    pub written: Vec<PathBuf>,
    /// Per-item failures; the pass carried on past each of them
    pub failures: Vec<SharkError>,
}

/// Make `folder` hold exactly `docs`.
///
/// Only a folder that can't be established is fatal. Individual deletion and
/// creation failures end up in [`ReconcileOutcome::failures`].
pub async fn reconcile(
    vault: &dyn Vault,
    folder: &Path,
    docs: &[ResolvedDocument],
    notifier: &dyn Notifier,
) -> Result<ReconcileOutcome> {
    let mut outcome = ReconcileOutcome::default();

    let children = match vault.folder_children(folder).await? {
        Some(children) => children,
        None => {
            tracing::info!(folder = %folder.display(), "creating sync folder");
            vault
                .create_folder(folder)
                .await
                .map_err(|e| folder_error(folder, e))?;
            outcome.folder_created = true;
            notifier.notify(SyncEvent::FolderCreated {
                path: folder.to_path_buf(),
            });

            vault
                .folder_children(folder)
                .await
                .map_err(|e| folder_error(folder, e))?
                .ok_or_else(|| SharkError::FolderCreate {
                    path: folder.to_path_buf(),
                    reason: "folder still missing after creation".to_string(),
                })?
        }
    };

    // Every deletion settles before the first write
    let deletions = join_all(children.iter().map(|entry| delete_entry(vault, entry))).await;
    let mut delete_failures = 0;
    for result in deletions {
        match result {
            Ok(()) => outcome.deleted += 1,
            Err(e) => {
                tracing::debug!(error = %e, "failed to delete old entry");
                delete_failures += 1;
                outcome.failures.push(e);
            }
        }
    }
    notifier.notify(SyncEvent::FolderCleared {
        deleted: outcome.deleted,
        failed: delete_failures,
    });

    let creations = join_all(docs.iter().map(|doc| create_document(vault, folder, doc))).await;
    for result in creations {
        match result {
            Ok(path) => outcome.written.push(path),
            Err(e) => {
                tracing::debug!(error = %e, "failed to write note");
                outcome.failures.push(e);
            }
        }
    }

    tracing::debug!(
        deleted = outcome.deleted,
        written = outcome.written.len(),
        failures = outcome.failures.len(),
        "reconcile finished"
    );

    Ok(outcome)
}

async fn delete_entry(vault: &dyn Vault, entry: &VaultEntry) -> Result<()> {
    vault
        .delete(entry)
        .await
        .map_err(|e| SharkError::Deletion {
            path: entry.path.clone(),
            reason: e.to_string(),
        })
}

async fn create_document(
    vault: &dyn Vault,
    folder: &Path,
    doc: &ResolvedDocument,
) -> Result<PathBuf> {
    let path = folder.join(doc.file_name_with_extension());
    let times = FileTimestamps {
        created: doc.created_at,
        modified: doc.modified_at,
    };
    vault
        .create_file(&path, &doc.body, times)
        .await
        .map_err(|e| SharkError::DocumentCreate {
            path: path.clone(),
            reason: e.to_string(),
        })?;
    Ok(path)
}

fn folder_error(folder: &Path, e: SharkError) -> SharkError {
    match e {
        SharkError::FolderCreate { .. } => e,
        other => SharkError::FolderCreate {
            path: folder.to_path_buf(),
            reason: other.to_string(),
        },
    }
}
