use super::error::{Error, Result};
use crate::sources::SourceKind;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default debounce interval for bookmark file change notifications
const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Configuration for searchbookmarks
#[derive(Debug, Clone)]
pub struct Config {
    /// User configuration directory (Chromium, Epiphany and Midori live here)
    pub config_dir: PathBuf,
    /// User home directory (Mozilla profiles and Opera live here)
    pub home_dir: PathBuf,
    /// Data directories searched for `applications/*.desktop`, in priority order
    pub data_dirs: Vec<PathBuf>,
    /// Debounce interval for file watches
    pub debounce: Duration,
    /// Sources that are never started
    pub disabled: Vec<SourceKind>,
}

/// On-disk shape of `config.yaml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    config_dir: Option<PathBuf>,
    home_dir: Option<PathBuf>,
    data_dirs: Option<Vec<PathBuf>>,
    debounce_ms: Option<u64>,
    disabled_sources: Vec<SourceKind>,
}

impl Config {
    /// Get the default user configuration directory
    pub fn default_config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the default location of the configuration file
    pub fn default_file_path() -> Result<PathBuf> {
        Self::default_config_dir().map(|dir| dir.join("searchbookmarks").join("config.yaml"))
    }

    /// Create a configuration from the platform defaults, overridden by a config file.
    ///
    /// An explicitly given file must exist; the default file is optional.
    pub fn new(file: Option<PathBuf>) -> Result<Self> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;
        let config_dir = Self::default_config_dir().unwrap_or_else(|_| home_dir.join(".config"));

        let mut config = Self {
            config_dir,
            home_dir,
            data_dirs: default_data_dirs(),
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            disabled: Vec::new(),
        };

        let (path, required) = match file {
            Some(path) => (path, true),
            None => match Self::default_file_path() {
                Ok(path) => (path, false),
                Err(_) => return Ok(config),
            },
        };

        if path.exists() {
            config.apply_file(&path)?;
        } else if required {
            return Err(Error::Config(format!(
                "Config file does not exist: {}",
                path.display()
            )));
        }

        Ok(config)
    }

    /// Create a configuration rooted at explicit directories, ignoring the environment
    pub fn with_roots(config_dir: impl Into<PathBuf>, home_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            home_dir: home_dir.into(),
            data_dirs: Vec::new(),
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            disabled: Vec::new(),
        }
    }

    /// Check whether a source kind may be started
    pub fn is_enabled(&self, kind: SourceKind) -> bool {
        !self.disabled.contains(&kind)
    }

    fn apply_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)?;
        let file: ConfigFile = serde_yaml::from_str(&content).map_err(|e| {
            Error::Config(format!("Invalid config file {}: {}", path.display(), e))
        })?;

        if let Some(dir) = file.config_dir {
            self.config_dir = dir;
        }
        if let Some(dir) = file.home_dir {
            self.home_dir = dir;
        }
        if let Some(dirs) = file.data_dirs {
            self.data_dirs = dirs;
        }
        if let Some(ms) = file.debounce_ms {
            self.debounce = Duration::from_millis(ms);
        }
        self.disabled = file.disabled_sources;

        Ok(())
    }
}

/// `$XDG_DATA_HOME` followed by `$XDG_DATA_DIRS` (or its documented fallback)
fn default_data_dirs() -> Vec<PathBuf> {
    let mut dirs_list: Vec<PathBuf> = dirs::data_dir().into_iter().collect();

    let system = std::env::var("XDG_DATA_DIRS")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| "/usr/local/share:/usr/share".to_string());

    for dir in system.split(':').filter(|d| !d.is_empty()) {
        let dir = PathBuf::from(dir);
        if !dirs_list.contains(&dir) {
            dirs_list.push(dir);
        }
    }

    dirs_list
}
