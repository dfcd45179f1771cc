use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "sharknotes")]
#[command(version, about = "Mirror Juejin flash notes into a folder of Markdown files")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Vault root the sync folder is relative to
    #[arg(long, global = true, value_name = "DIR", default_value = ".")]
    pub vault: PathBuf,

    /// Log debug output to stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replace the sync folder's contents with the current remote notes
    Sync {
        /// Show what would be written without touching the folder
        #[arg(long)]
        dry_run: bool,

        /// Don't ask before replacing existing files
        #[arg(long, short = 'y')]
        yes: bool,

        /// Output the sync report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or change settings
    Config(ConfigCommand),
}

#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the current settings (cookie masked)
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change a setting (sync-path, cookie, endpoint)
    Set {
        /// Setting name
        key: String,

        /// New value
        value: String,
    },

    /// Print the settings file location
    Path,
}
