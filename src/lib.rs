pub mod cli;
pub mod config;
pub mod error;
pub mod notify;
pub mod reconcile;
pub mod remote;
pub mod sync;
pub mod transform;
pub mod vault;

pub use config::{Config, Settings};
pub use error::{Result, SharkError};
pub use sync::{SyncOptions, SyncReport, Syncer};
