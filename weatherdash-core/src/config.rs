use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

/// Environment variables checked for the API credential, in priority order.
pub const API_KEY_VARS: &[&str] = &["OPENWEATHER_API_KEY", "WEATHERAPI_KEY"];
pub const CACHE_TTL_VAR: &str = "CACHE_TTL_SECONDS";

pub const DEFAULT_ENDPOINT: &str = "http://api.weatherapi.com/v1/current.json";
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "No API key configured.\n\
         Hint: set OPENWEATHER_API_KEY (or WEATHERAPI_KEY), or run `weatherdash configure`."
    )]
    MissingApiKey,

    #[error("Invalid cache TTL '{value}' from {origin}: expected a whole number of seconds")]
    InvalidTtl { origin: String, value: String },
}

/// Configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// cache_ttl_seconds = 30
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub api_key: Option<String>,
    pub cache_ttl_seconds: Option<u64>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weatherdash", "weatherdash")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Resolved runtime settings handed to the fetcher and the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_key: String,
    pub cache_ttl: Duration,
    pub endpoint: String,
    pub timeout: Duration,
}

impl Settings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            cache_ttl: DEFAULT_CACHE_TTL,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Read the config file and the process environment once.
    pub fn load() -> Result<Self> {
        let file = Config::load()?;
        let settings = Self::resolve(&file, |name| std::env::var(name).ok())?;
        tracing::debug!(ttl_secs = settings.cache_ttl.as_secs(), "settings loaded");
        Ok(settings)
    }

    /// Environment wins over the file; blank values count as unset.
    pub fn resolve(
        file: &Config,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let non_blank = |v: String| if v.trim().is_empty() { None } else { Some(v) };

        let api_key = API_KEY_VARS
            .iter()
            .find_map(|name| env(*name).and_then(non_blank))
            .or_else(|| file.api_key.clone().and_then(non_blank))
            .ok_or(ConfigError::MissingApiKey)?;

        let cache_ttl = match env(CACHE_TTL_VAR).and_then(non_blank) {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidTtl {
                    origin: CACHE_TTL_VAR.to_string(),
                    value: raw.clone(),
                })?;
                Duration::from_secs(secs)
            }
            None => file.cache_ttl_seconds.map(Duration::from_secs).unwrap_or(DEFAULT_CACHE_TTL),
        };

        Ok(Self { cache_ttl, ..Self::new(api_key) })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}
