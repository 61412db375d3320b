//! Engine configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::CoreError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the database file holding persisted sessions
    pub database_path: PathBuf,
    /// Quiet period before a search edit re-runs the pipeline
    pub search_debounce_ms: u64,
    /// How long an armed close stays armed
    pub close_confirm_timeout_ms: u64,
    /// Upper bound on waiting for a restored tab to finish loading
    pub tab_load_timeout_ms: u64,
    /// Bookmark folders are named "<prefix> <date>"
    pub bookmark_folder_prefix: String,
    /// Written into session exports
    pub exported_by: String,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            database_path: data_dir.join("tabstash.db"),
            search_debounce_ms: 150,
            close_confirm_timeout_ms: 3_000,
            tab_load_timeout_ms: 30_000,
            bookmark_folder_prefix: "Tabstash".to_string(),
            exported_by: "Tabstash".to_string(),
        }
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("Tabstash"))
            .unwrap_or_else(|| PathBuf::from(".tabstash"))
    }

    /// Read a JSON config file. Missing keys take their defaults; a missing
    /// file yields the default config.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&raw)
            .map_err(|e| CoreError::Config(format!("{}: {e}", path.display())))
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn close_confirm_timeout(&self) -> Duration {
        Duration::from_millis(self.close_confirm_timeout_ms)
    }

    pub fn tab_load_timeout(&self) -> Duration {
        Duration::from_millis(self.tab_load_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

// Platform data directory lookup
mod dirs {
    use std::path::PathBuf;

    pub fn data_local_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("LOCALAPPDATA").ok().map(PathBuf::from)
        }
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Library/Application Support"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_DATA_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".local/share"))
                })
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }
}
