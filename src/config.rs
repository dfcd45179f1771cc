//! Settings persistence for sharknotes.
//!
//! Settings live in a single JSON file. Loading merges whatever is on disk
//! over the defaults; every edit is written straight back.

use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SharkError};

pub const DEFAULT_SYNC_PATH: &str = "sharkNotes";
pub const DEFAULT_ENDPOINT: &str =
    "https://api.juejin.cn/note_api/note/list_all?aid=6587&uuid=7354201638113019431";

const CONFIG_DIR_NAME: &str = "sharknotes";
const CONFIG_FILE_NAME: &str = "settings.json";

/// Persisted user settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Folder, relative to the vault root, that receives the notes
    #[serde(
        rename = "syncPath",
        alias = "sync_path",
        default = "default_sync_path"
    )]
    pub sync_path: String,
    /// Raw session cookie copied from a logged-in browser
    #[serde(default)]
    pub cookie: String,
    /// Note list endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

fn default_sync_path() -> String {
    DEFAULT_SYNC_PATH.to_string()
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sync_path: default_sync_path(),
            cookie: String::new(),
            endpoint: default_endpoint(),
        }
    }
}

impl Settings {
    pub fn has_cookie(&self) -> bool {
        !self.cookie.trim().is_empty()
    }

    /// The sync folder as a path relative to the vault root.
    ///
    /// Everything inside this folder is deleted on each sync, so it has to
    /// stay strictly below the root.
    pub fn target_folder(&self) -> Result<PathBuf> {
        let trimmed = self.sync_path.trim().trim_end_matches(['/', '\\']);
        if trimmed.is_empty() {
            return Err(SharkError::Config("sync_path must not be empty".to_string()));
        }

        let path = PathBuf::from(trimmed);
        let mut normal = 0;
        for component in path.components() {
            match component {
                Component::Normal(_) => normal += 1,
                Component::CurDir => {}
                Component::ParentDir => {
                    return Err(SharkError::Config(format!(
                        "sync_path '{}' must not contain '..'",
                        self.sync_path
                    )))
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(SharkError::Config(format!(
                        "sync_path '{}' must be relative to the vault",
                        self.sync_path
                    )))
                }
            }
        }
        if normal == 0 {
            return Err(SharkError::Config(format!(
                "sync_path '{}' must name a folder inside the vault",
                self.sync_path
            )));
        }

        Ok(path)
    }

    /// Cookie with all but a short prefix hidden, for display.
    pub fn masked_cookie(&self) -> String {
        let cookie = self.cookie.trim();
        if cookie.is_empty() {
            return "(not set)".to_string();
        }
        let prefix: String = cookie.chars().take(6).collect();
        if prefix.len() == cookie.len() {
            "******".to_string()
        } else {
            format!("{}******", prefix)
        }
    }
}

/// A settings key that can be edited from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    SyncPath,
    Cookie,
    Endpoint,
}

impl std::str::FromStr for SettingKey {
    type Err = SharkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "sync-path" => Ok(SettingKey::SyncPath),
            "cookie" => Ok(SettingKey::Cookie),
            "endpoint" => Ok(SettingKey::Endpoint),
            other => Err(SharkError::Config(format!(
                "unknown setting '{}' (expected sync-path, cookie or endpoint)",
                other
            ))),
        }
    }
}

/// Configuration manager owning the settings and their file
pub struct Config {
    config_file: PathBuf,
    settings: Settings,
}

impl Config {
    /// Default settings file location in the platform config directory.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Load settings from `config_file`, merged over the defaults.
    ///
    /// A missing file yields the defaults. A file that exists but does not
    /// parse is an error, so a later save can't wipe a stored cookie.
    pub fn load(config_file: impl Into<PathBuf>) -> Result<Self> {
        let config_file = config_file.into();

        let settings = if config_file.exists() {
            let content = fs::read_to_string(&config_file)?;
            if content.trim().is_empty() {
                Settings::default()
            } else {
                serde_json::from_str(&content).map_err(|e| {
                    SharkError::Config(format!("{}: {}", config_file.display(), e))
                })?
            }
        } else {
            tracing::debug!(path = %config_file.display(), "no settings file, using defaults");
            Settings::default()
        };

        Ok(Self {
            config_file,
            settings,
        })
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_file.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(&self.settings)?;
        fs::write(&self.config_file, content)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.config_file
    }

    /// Directory holding the settings file (also used for the sync lock).
    pub fn dir(&self) -> PathBuf {
        match self.config_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Update one setting and persist immediately.
    pub fn set(&mut self, key: SettingKey, value: &str) -> Result<()> {
        match key {
            SettingKey::SyncPath => {
                let candidate = Settings {
                    sync_path: value.to_string(),
                    ..self.settings.clone()
                };
                candidate.target_folder()?;
                self.settings.sync_path = value.to_string();
            }
            SettingKey::Cookie => self.settings.cookie = value.trim().to_string(),
            SettingKey::Endpoint => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    return Err(SharkError::Config(format!(
                        "endpoint '{}' must be an http(s) URL",
                        value
                    )));
                }
                self.settings.endpoint = value.to_string();
            }
        }
        self.save()
    }
}
