//! Runtime configuration.
//!
//! Settings live in a `[Settings]` table:
//!
//! ```toml
//! [Settings]
//! refresh_interval = 30
//! max_history = 50
//! plot_width = 100
//! plot_height = 20
//! ```
//!
//! The same text is valid INI, so a `config.ini` written for older versions
//! loads unchanged. A missing file or missing keys fall back to defaults; a
//! malformed file falls back to defaults as a whole and reports a
//! [`ConfigError`] for the caller to surface as a warning.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::history::DEFAULT_MAX_HISTORY;
use crate::schedule::DEFAULT_REFRESH_SECS;

/// Candidate file names looked up in the working directory.
const LOCAL_CANDIDATES: [&str; 2] = ["config.toml", "config.ini"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed config file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seconds between refresh cycles.
    pub refresh_interval: u64,
    /// History points kept per symbol.
    pub max_history: usize,
    /// Chart width hint in columns.
    pub plot_width: u16,
    /// Chart height hint in rows.
    pub plot_height: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_SECS,
            max_history: DEFAULT_MAX_HISTORY,
            plot_width: 100,
            plot_height: 20,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(rename = "Settings", alias = "settings", default)]
    settings: Config,
}

impl Config {
    /// Parse configuration text. Keys outside `[Settings]` are ignored.
    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str::<ConfigFile>(content)
            .map(|file| file.settings)
            .map_err(|e| e.to_string())
    }

    /// Load `path`. A missing file yields defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::from_toml(&content).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Load `path` if given, otherwise the first config file found by
    /// [`Config::locate`]. Never fails: errors come back alongside defaults.
    pub fn load_or_default(path: Option<&Path>) -> (Self, Option<ConfigError>) {
        let Some(path) = path.map(Path::to_path_buf).or_else(Self::locate) else {
            return (Self::default(), None);
        };
        match Self::from_file(&path) {
            Ok(config) => (config, None),
            Err(e) => {
                log::warn!("{e}; using default settings");
                (Self::default(), Some(e))
            }
        }
    }

    /// First existing file among `./config.toml`, `./config.ini` and
    /// `<config_dir>/gpwatch/config.toml`.
    pub fn locate() -> Option<PathBuf> {
        LOCAL_CANDIDATES
            .iter()
            .map(PathBuf::from)
            .chain(dirs::config_dir().map(|dir| dir.join("gpwatch").join("config.toml")))
            .find(|candidate| candidate.is_file())
    }

    /// Refresh interval, at least one second.
    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs(self.refresh_interval.max(1))
    }
}
