use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharkError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response from note service: {0}")]
    Protocol(String),

    #[error("Could not create sync folder {path}: {reason}")]
    FolderCreate { path: PathBuf, reason: String },

    #[error("Could not delete {path}: {reason}")]
    Deletion { path: PathBuf, reason: String },

    #[error("Could not write {path}: {reason}")]
    DocumentCreate { path: PathBuf, reason: String },

    #[error("Sync incomplete: {written} of {total} notes written, {failures} problems")]
    Incomplete {
        written: usize,
        total: usize,
        failures: usize,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Another sync is already running")]
    SyncInProgress,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SharkError>;
