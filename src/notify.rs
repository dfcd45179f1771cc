//! User-facing sync notifications.
//!
//! The sync engine reports progress and failures as [`SyncEvent`]s through a
//! [`Notifier`]. The CLI prints them; tests collect them.

use std::path::PathBuf;
use std::sync::Mutex;

/// Something the user should hear about during a sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// No cookie is configured, nothing was attempted.
    MissingCredential,
    /// The note list was downloaded.
    Fetched { count: usize },
    /// The service claims more notes than it returned.
    PossiblyTruncated { received: usize, reported: i64 },
    /// The sync folder did not exist and was created.
    FolderCreated { path: PathBuf },
    /// Old contents of the sync folder were removed.
    FolderCleared { deleted: usize, failed: usize },
    /// Summary at the end of a pass.
    Synced { written: usize, total: usize },
    /// Dry run: nothing was touched.
    DryRun { planned: usize, path: PathBuf },
    /// A single deletion or write failed.
    Failure { message: String },
}

impl SyncEvent {
    pub fn is_failure(&self) -> bool {
        matches!(self, SyncEvent::Failure { .. } | SyncEvent::MissingCredential)
    }
}

/// Format an event for display.
pub fn format_event(event: &SyncEvent) -> String {
    match event {
        SyncEvent::MissingCredential => {
            "Please set cookie first: sharknotes config set cookie '<cookie>'".to_string()
        }
        SyncEvent::Fetched { count } => format!("Pulled {} notes", count),
        SyncEvent::PossiblyTruncated { received, reported } => format!(
            "Warning: service reported {} notes but returned {} - some may be missing",
            reported, received
        ),
        SyncEvent::FolderCreated { path } => format!("Created folder {}", path.display()),
        SyncEvent::FolderCleared { deleted, failed } => {
            if *failed == 0 {
                format!("Deleted {} old entries", deleted)
            } else {
                format!("Deleted {} old entries ({} could not be deleted)", deleted, failed)
            }
        }
        SyncEvent::Synced { written, total } => {
            if written == total {
                format!("Synced {} notes", written)
            } else {
                format!("Synced {} of {} notes", written, total)
            }
        }
        SyncEvent::DryRun { planned, path } => format!(
            "Dry run: would replace the contents of {} with {} notes",
            path.display(),
            planned
        ),
        SyncEvent::Failure { message } => format!("Error: {}", message),
    }
}

/// Receiver for sync events
pub trait Notifier: Send + Sync {
    fn notify(&self, event: SyncEvent);
}

/// Prints events to the terminal. Failures go to stderr.
#[derive(Debug, Default)]
pub struct ConsoleNotifier {
    quiet: bool,
}

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only failures are printed.
    pub fn quiet() -> Self {
        Self { quiet: true }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, event: SyncEvent) {
        if event.is_failure() {
            eprintln!("{}", format_event(&event));
        } else if !self.quiet {
            println!("{}", format_event(&event));
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    events: Mutex<Vec<SyncEvent>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SyncEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, event: SyncEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
