//! One sync pass: fetch, transform, reconcile.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::Settings;
use crate::error::{Result, SharkError};
use crate::notify::{Notifier, SyncEvent};
use crate::reconcile::reconcile;
use crate::remote::NoteSource;
use crate::transform::{resolve_all, ResolvedDocument};
use crate::vault::{epoch_to_system_time, Vault};

#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Resolve notes but leave the folder alone
    pub dry_run: bool,
}

/// A note the pass wrote, or would write on a dry run
#[derive(Debug, Clone, Serialize)]
pub struct PlannedNote {
    pub file: String,
    pub created: Option<String>,
    pub modified: Option<String>,
}

impl PlannedNote {
    fn from_document(doc: &ResolvedDocument) -> Self {
        Self {
            file: doc.file_name_with_extension(),
            created: format_epoch(doc.created_at),
            modified: format_epoch(doc.modified_at),
        }
    }
}

/// Result of a sync pass
#[derive(Debug, Default, Serialize)]
pub struct SyncReport {
    pub target: PathBuf,
    pub dry_run: bool,
    pub fetched: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported_count: Option<i64>,
    pub folder_created: bool,
    pub deleted: usize,
    pub notes: Vec<PlannedNote>,
    pub written: Vec<PathBuf>,
    pub failures: Vec<String>,
}

impl SyncReport {
    /// True when every planned note made it to disk and nothing failed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && (self.dry_run || self.written.len() == self.notes.len())
    }
}

/// Runs sync passes against one vault with one set of settings.
///
/// Only one pass may be in flight at a time; a second call while one is
/// running fails with [`SharkError::SyncInProgress`].
pub struct Syncer {
    settings: Settings,
    source: Arc<dyn NoteSource>,
    vault: Arc<dyn Vault>,
    notifier: Arc<dyn Notifier>,
    in_flight: AtomicBool,
}

impl Syncer {
    pub fn new(
        settings: Settings,
        source: Arc<dyn NoteSource>,
        vault: Arc<dyn Vault>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            settings,
            source,
            vault,
            notifier,
            in_flight: AtomicBool::new(false),
        }
    }

    pub async fn run_sync(&self, options: SyncOptions) -> Result<SyncReport> {
        let _guard = RunGuard::acquire(&self.in_flight)?;

        if !self.settings.has_cookie() {
            self.notifier.notify(SyncEvent::MissingCredential);
            return Err(SharkError::Auth("no cookie configured".to_string()));
        }
        let folder = self.settings.target_folder()?;

        tracing::info!(folder = %folder.display(), dry_run = options.dry_run, "starting sync");

        let fetched = self.source.fetch_all_notes(&self.settings.cookie).await?;
        self.notifier.notify(SyncEvent::Fetched {
            count: fetched.notes.len(),
        });
        if fetched.is_truncated() {
            if let Some(reported) = fetched.reported_count {
                self.notifier.notify(SyncEvent::PossiblyTruncated {
                    received: fetched.notes.len(),
                    reported,
                });
            }
        }

        let docs = resolve_all(&fetched.notes);

        let mut report = SyncReport {
            target: folder.clone(),
            dry_run: options.dry_run,
            fetched: fetched.notes.len(),
            reported_count: fetched.reported_count,
            notes: docs.iter().map(PlannedNote::from_document).collect(),
            ..Default::default()
        };

        if options.dry_run {
            self.notifier.notify(SyncEvent::DryRun {
                planned: docs.len(),
                path: folder,
            });
            return Ok(report);
        }

        let outcome = reconcile(
            self.vault.as_ref(),
            &folder,
            &docs,
            self.notifier.as_ref(),
        )
        .await?;

        report.folder_created = outcome.folder_created;
        report.deleted = outcome.deleted;
        report.written = outcome.written;

        for failure in outcome.failures {
            let message = failure.to_string();
            self.notifier.notify(SyncEvent::Failure {
                message: message.clone(),
            });
            report.failures.push(message);
        }

        self.notifier.notify(SyncEvent::Synced {
            written: report.written.len(),
            total: docs.len(),
        });
        tracing::info!(
            written = report.written.len(),
            failures = report.failures.len(),
            "sync finished"
        );

        Ok(report)
    }
}

/// Holds the in-flight flag for the duration of a pass
struct RunGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SharkError::SyncInProgress)?;
        Ok(Self { flag })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

fn format_epoch(value: i64) -> Option<String> {
    epoch_to_system_time(value).map(|t| {
        DateTime::<Utc>::from(t)
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string()
    })
}
