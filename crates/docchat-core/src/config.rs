//! Client configuration.
//!
//! Values are resolved in layers: built-in defaults, then an optional TOML
//! file, then environment variables. Command-line overrides are applied by
//! the binary on top of the result.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DocchatError, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_SAMPLE_SIZE: usize = 5;

/// Environment variable overriding `base_url`.
pub const BASE_URL_ENV: &str = "DOCCHAT_BASE_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub stream_idle_timeout_secs: u64,
    pub sample_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            stream_idle_timeout_secs: 120,
            sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }
}

impl ClientConfig {
    /// Default config file location: `<config_dir>/docchat/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("docchat").join("config.toml"))
    }

    /// Loads configuration from `path`, falling back to defaults when the file does not exist.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.base_url = normalize_base_url(&config.base_url)?;
        Ok(config)
    }

    /// Loads the default config file (if any) and applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// Like [`ClientConfig::load`], reading environment overrides through `env`.
    pub fn load_with_env(
        path: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_path(path)?,
            None => match Self::default_path() {
                Some(path) => Self::load_from_path(&path)?,
                None => Self::default(),
            },
        };
        if let Some(base_url) = env(BASE_URL_ENV) {
            tracing::debug!(%base_url, "base URL overridden by environment");
            config = config.with_base_url(&base_url)?;
        }
        Ok(config)
    }

    /// Returns a copy with a validated `base_url`.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.base_url = normalize_base_url(base_url)?;
        Ok(self)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn stream_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.stream_idle_timeout_secs)
    }
}

/// Validates an http(s) base URL and strips trailing slashes.
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let parsed = Url::parse(trimmed)?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(DocchatError::config(format!(
            "base URL must use http or https, got '{}'",
            parsed.scheme()
        )));
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}
