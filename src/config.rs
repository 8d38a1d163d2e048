//! Layered configuration: defaults, `config.toml`, environment, CLI flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

pub const ENV_API_URL: &str = "EARTH_NEWS_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "EARTH_NEWS_TIMEOUT_SECS";
pub const ENV_DATA_DIR: &str = "EARTH_NEWS_DATA_DIR";
pub const ENV_CONFIG: &str = "EARTH_NEWS_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the news backend.
    pub api_url: String,
    pub timeout_secs: u64,
    /// Where `filters.json`, `tui_state.json` and logs live.
    pub data_dir: Option<PathBuf>,
    /// Initial theme when no preference was saved yet.
    pub theme: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            data_dir: None,
            theme: None,
        }
    }
}

/// Values given on the command line; they win over everything else.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub config_path: Option<PathBuf>,
}

impl Config {
    pub fn load(overrides: &ConfigOverrides) -> Result<Self> {
        let path = overrides
            .config_path
            .clone()
            .or_else(|| dotenvy::var(ENV_CONFIG).ok().map(PathBuf::from))
            .unwrap_or_else(default_config_path);
        let mut config = Self::from_file(&path)?.unwrap_or_default();
        config.apply_env()?;
        if let Some(url) = &overrides.api_url {
            config.api_url = url.clone();
        }
        if let Some(dir) = &overrides.data_dir {
            config.data_dir = Some(dir.clone());
        }
        tracing::debug!(api_url = %config.api_url, config = %path.display(), "config_loaded");
        Ok(config)
    }

    /// `Ok(None)` when the file does not exist.
    pub fn from_file(path: &Path) -> Result<Option<Self>> {
        let body = match std::fs::read_to_string(path) {
            Ok(body) => body,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("reading {}", path.display()));
            }
        };
        let config: Self =
            toml::from_str(&body).with_context(|| format!("parsing {}", path.display()))?;
        anyhow::ensure!(
            config.timeout_secs > 0,
            "{}: timeout_secs must be at least 1",
            path.display()
        );
        Ok(Some(config))
    }

    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = dotenvy::var(ENV_API_URL)
            && !url.trim().is_empty()
        {
            self.api_url = url.trim().to_string();
        }
        if let Ok(secs) = dotenvy::var(ENV_TIMEOUT_SECS) {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds"))?;
            anyhow::ensure!(secs > 0, "{ENV_TIMEOUT_SECS} must be at least 1 second");
            self.timeout_secs = secs;
        }
        if let Ok(dir) = dotenvy::var(ENV_DATA_DIR)
            && !dir.trim().is_empty()
        {
            self.data_dir = Some(PathBuf::from(dir.trim()));
        }
        Ok(())
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(crate::default_data_dir)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

pub fn default_config_path() -> PathBuf {
    directories::ProjectDirs::from("org", "state-of-the-earth", "earth-news").map_or_else(
        || PathBuf::from("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}
