use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{Config, SettingKey};
use crate::error::{Result, SharkError};
use crate::notify::ConsoleNotifier;
use crate::remote::RemoteNoteClient;
use crate::sync::{SyncOptions, SyncReport, Syncer};
use crate::vault::{FsVault, Vault};

const LOCK_FILE_NAME: &str = "sync.lock";

fn load_config(config_path: Option<PathBuf>) -> Result<Config> {
    Config::load(config_path.unwrap_or_else(Config::default_path))
}

pub async fn handle_sync(
    config_path: Option<PathBuf>,
    vault_root: PathBuf,
    dry_run: bool,
    yes: bool,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let settings = config.settings().clone();

    if !vault_root.is_dir() {
        return Err(SharkError::Config(format!(
            "vault root {} is not a directory",
            vault_root.display()
        )));
    }

    // One sync per settings file across processes
    let _lock = acquire_sync_lock(&config.dir())?;

    let vault = Arc::new(FsVault::new(&vault_root));

    if !dry_run && !yes && settings.has_cookie() {
        let folder = settings.target_folder()?;
        if let Some(children) = vault.folder_children(&folder).await? {
            if !children.is_empty() && !confirm_replace(&vault_root.join(&folder), children.len())? {
                println!("Cancelled.");
                return Ok(());
            }
        }
    }

    let source = Arc::new(RemoteNoteClient::new(settings.endpoint.clone())?);
    let notifier = if json {
        Arc::new(ConsoleNotifier::quiet())
    } else {
        Arc::new(ConsoleNotifier::new())
    };
    let syncer = Syncer::new(settings, source, vault, notifier);

    let report = syncer.run_sync(SyncOptions { dry_run }).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if dry_run {
        print_plan(&report);
    }

    if !report.is_complete() {
        return Err(SharkError::Incomplete {
            written: report.written.len(),
            total: report.notes.len(),
            failures: report.failures.len(),
        });
    }

    Ok(())
}

pub fn handle_config_show(config_path: Option<PathBuf>, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let settings = config.settings();

    if json {
        #[derive(serde::Serialize)]
        struct SettingsJson<'a> {
            path: String,
            #[serde(rename = "syncPath")]
            sync_path: &'a str,
            cookie: String,
            endpoint: &'a str,
        }

        let out = SettingsJson {
            path: config.path().display().to_string(),
            sync_path: &settings.sync_path,
            cookie: settings.masked_cookie(),
            endpoint: &settings.endpoint,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Settings file: {}", config.path().display());
        println!("  sync-path: {}", settings.sync_path);
        println!("  cookie:    {}", settings.masked_cookie());
        println!("  endpoint:  {}", settings.endpoint);
    }

    Ok(())
}

pub fn handle_config_set(config_path: Option<PathBuf>, key: String, value: String) -> Result<()> {
    let key: SettingKey = key.parse()?;
    let mut config = load_config(config_path)?;
    config.set(key, &value)?;

    match key {
        SettingKey::Cookie => println!("Saved cookie ({})", config.settings().masked_cookie()),
        SettingKey::SyncPath => println!("Saved sync-path: {}", config.settings().sync_path),
        SettingKey::Endpoint => println!("Saved endpoint: {}", config.settings().endpoint),
    }

    Ok(())
}

pub fn handle_config_path(config_path: Option<PathBuf>) -> Result<()> {
    println!("{}", config_path.unwrap_or_else(Config::default_path).display());
    Ok(())
}

fn acquire_sync_lock(dir: &Path) -> Result<File> {
    use fs2::FileExt;

    fs::create_dir_all(dir)?;
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(dir.join(LOCK_FILE_NAME))?;
    file.try_lock_exclusive()
        .map_err(|_| SharkError::SyncInProgress)?;
    Ok(file)
}

fn confirm_replace(folder: &Path, existing: usize) -> Result<bool> {
    // Scripts and schedulers run without a terminal; they asked for the sync
    if !atty::is(atty::Stream::Stdin) {
        return Ok(true);
    }

    eprintln!(
        "Replace all {} entries in {} with the remote notes? [y/N] ",
        existing,
        folder.display()
    );
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

fn print_plan(report: &SyncReport) {
    if report.notes.is_empty() {
        println!("No notes to write.");
        return;
    }
    for note in &report.notes {
        match &note.modified {
            Some(modified) => println!("  {}  ({})", note.file, modified),
            None => println!("  {}", note.file),
        }
    }
}
