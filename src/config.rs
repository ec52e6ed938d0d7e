//! Runtime configuration
//!
//! Settings come from, in increasing precedence: built-in defaults, an optional
//! TOML file, the `OPENWEATHER_API_KEY` environment variable and the command line.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::StartupConfig;
use crate::data::client::OPENWEATHER_BASE_URL;
use crate::data::location::IP_API_URL;
use crate::data::Units;

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

const CONFIG_FILE: &str = "config.toml";

/// Shortest request timeout; a zero timeout would fail every request
const MIN_TIMEOUT_SECS: u64 = 1;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema
    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// No API key from any source
    #[error("No OpenWeatherMap API key: pass --api-key, set OPENWEATHER_API_KEY or add api_key to the config file")]
    MissingApiKey,
}

/// Dashboard settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OpenWeatherMap API key
    pub api_key: Option<String>,
    /// API root for weather, forecast and air pollution requests
    pub base_url: String,
    /// Unit system on start-up
    pub units: Units,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Whether to look up the host location when no city is given
    pub locate_on_startup: bool,
    /// IP geolocation endpoint (ip-api.com response shape)
    pub locator_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: OPENWEATHER_BASE_URL.to_string(),
            units: Units::Metric,
            timeout_secs: 10,
            locate_on_startup: true,
            locator_url: IP_API_URL.to_string(),
        }
    }
}

impl Config {
    /// Default config file location (`~/.config/weatherdash/config.toml` on Linux)
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "weatherdash").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Loads settings from `path`, or from the default location if `None`.
    ///
    /// An explicitly given file must exist; a missing default file yields the
    /// built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Parses a TOML config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Applies an API key taken from the environment
    pub fn with_env_key(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        self
    }

    /// Applies command-line overrides
    pub fn with_startup(mut self, startup: &StartupConfig) -> Self {
        if let Some(key) = startup.api_key.clone() {
            self.api_key = Some(key);
        }
        if let Some(units) = startup.units {
            self.units = units;
        }
        self
    }

    /// The API key, or an error if none was configured
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }

    /// Per-request timeout, at least one second
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(MIN_TIMEOUT_SECS))
    }
}
