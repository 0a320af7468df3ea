use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use datebook_core::store::DEFAULT_CALENDAR;

/// Global configuration at ~/.config/datebook/config.toml
///
/// Every field is optional. Command-line flags win over the file.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Directory holding the calendar JSON files
    pub data_dir: Option<String>,

    /// Calendar used when `--calendar` is not given
    pub default_calendar: Option<String>,

    /// `tracing` filter used when RUST_LOG is unset
    pub log_filter: Option<String>,
}

impl Config {
    /// Data directory with `~` expanded, falling back to the platform data dir.
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(expand_path(dir)),
            None => Ok(dirs::data_dir()
                .context("Could not determine data directory")?
                .join("datebook")),
        }
    }

    pub fn calendar(&self) -> &str {
        self.default_calendar.as_deref().unwrap_or(DEFAULT_CALENDAR)
    }
}

/// Get the config file path (~/.config/datebook/config.toml)
pub fn config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Could not determine config directory")?
        .join("datebook");
    Ok(config_dir.join("config.toml"))
}

/// Load config from `path`, or the default location when `None`.
///
/// A missing file yields the defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => config_path()?,
    };

    if !path.exists() {
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;

    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

    Ok(config)
}

/// Expand ~ in paths to the home directory
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
