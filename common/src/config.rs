use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Context, Result};
use std::fs;
use crate::error::Error;
use crate::poll::PollConfig;

pub const API_KEY_ENV: &str = "FASTFOLD_API_KEY";
pub const BASE_URL_ENV: &str = "FASTFOLD_BASE_URL";
pub const CONFIG_PATH_ENV: &str = "FASTFOLD_CONFIG";
pub const LOCAL_CONFIG_FILE: &str = "fastfold.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollFileConfig {
    pub interval_secs: Option<f64>,
    pub timeout_secs: Option<f64>,
}

/// Contents of the optional config file. Every key may be left out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    #[serde(default)]
    pub poll: PollFileConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    /// Detect file type by extension and load
    pub fn from_file(path: &Path) -> Result<Self> {
        let ext = path.extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");

        match ext {
            "yaml" | "yml" => Self::from_yaml_file(path),
            "toml" => Self::from_toml_file(path),
            _ => Err(anyhow::anyhow!("Unsupported config file format. Use .yaml, .yml, or .toml")),
        }
    }

    /// Merge with another config, preferring values set in other
    pub fn merge(&mut self, other: Config) {
        if other.api_key.is_some() {
            self.api_key = other.api_key;
        }
        if other.base_url.is_some() {
            self.base_url = other.base_url;
        }
        if other.poll.interval_secs.is_some() {
            self.poll.interval_secs = other.poll.interval_secs;
        }
        if other.poll.timeout_secs.is_some() {
            self.poll.timeout_secs = other.poll.timeout_secs;
        }
    }
}

/// Default config file location: `$FASTFOLD_CONFIG`, else
/// `<user config dir>/fastfold/config.toml`.
pub fn default_config_path(env: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    if let Some(path) = non_empty(env(CONFIG_PATH_ENV)) {
        return Some(PathBuf::from(path));
    }
    directories::ProjectDirs::from("ai", "fastfold", "fastfold")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load the config file if one exists. A file named through
/// `FASTFOLD_CONFIG` must exist and parse; the per-user default and the
/// `fastfold.toml` in `local_dir` (layered on top) are skipped with a
/// warning when they cannot be read.
pub fn load_config(env: impl Fn(&str) -> Option<String>, local_dir: &Path) -> Result<Config> {
    let explicit = non_empty(env(CONFIG_PATH_ENV)).is_some();
    let mut config = match default_config_path(&env) {
        Some(path) if explicit => {
            log::debug!("Loading config from {}", path.display());
            Config::from_file(&path)?
        }
        Some(path) if path.exists() => load_optional(&path).unwrap_or_default(),
        _ => Config::default(),
    };

    let local = local_dir.join(LOCAL_CONFIG_FILE);
    if local.exists() {
        if let Some(local) = load_optional(&local) {
            config.merge(local);
        }
    }
    Ok(config)
}

fn load_optional(path: &Path) -> Option<Config> {
    log::debug!("Loading config from {}", path.display());
    match Config::from_file(path) {
        Ok(config) => Some(config),
        Err(e) => {
            log::warn!("Ignoring config file {}: {:#}", path.display(), e);
            None
        }
    }
}

/// Values given on the command line; they win over everything else.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub poll_interval: Option<Duration>,
    pub timeout: Option<Duration>,
}

/// Settings for one invocation, resolved once from flags, environment,
/// config file and built-in defaults, in that order.
#[derive(Debug, Clone)]
pub struct Settings {
    api_key: Option<String>,
    pub base_url: String,
    pub poll: PollConfig,
}

impl Settings {
    pub fn resolve(flags: Overrides, env: impl Fn(&str) -> Option<String>, file: Config) -> Self {
        let api_key = non_empty(flags.api_key)
            .or_else(|| non_empty(env(API_KEY_ENV)))
            .or_else(|| non_empty(file.api_key));
        let base_url = non_empty(flags.base_url)
            .or_else(|| non_empty(env(BASE_URL_ENV)))
            .or_else(|| non_empty(file.base_url))
            .unwrap_or_else(|| crate::DEFAULT_BASE_URL.to_string());

        let defaults = PollConfig::default();
        let from_secs = |s: Option<f64>| s.and_then(|v| Duration::try_from_secs_f64(v).ok());
        let poll = PollConfig {
            interval: flags
                .poll_interval
                .or_else(|| from_secs(file.poll.interval_secs))
                .unwrap_or(defaults.interval),
            timeout: flags
                .timeout
                .or_else(|| from_secs(file.poll.timeout_secs))
                .unwrap_or(defaults.timeout),
        };

        Self { api_key, base_url, poll }
    }

    pub fn api_key(&self) -> Result<&str, Error> {
        self.api_key.as_deref().ok_or(Error::MissingApiKey)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
