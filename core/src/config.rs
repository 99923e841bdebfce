use crate::errors::{MuseError, MuseResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_NAME: &str = "musemate";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_BACKOFF_MS: u64 = 400;

/// Configuration for the spark pipeline
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MuseConfig {
    pub api_key: Option<String>,
    pub model_name: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub backoff_ms: Option<u64>,
    pub font_path: Option<PathBuf>,
}

impl Default for MuseConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model_name: Some(DEFAULT_MODEL.to_string()),
            base_url: Some(DEFAULT_BASE_URL.to_string()),
            timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
            backoff_ms: Some(DEFAULT_BACKOFF_MS),
            font_path: None,
        }
    }
}

impl MuseConfig {
    /// Loads configuration from a file if it exists, otherwise returns the default config.
    /// Keys missing from the file keep their defaults.
    pub fn load_from_file(path: &Path) -> MuseResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| MuseError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| MuseError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        Ok(Self::default().merge(&config))
    }

    /// Loads `~/.config/musemate/config.toml`, falling back to defaults
    pub fn load_default() -> MuseResult<Self> {
        let path = get_default_config_file(APP_NAME)?;
        Self::load_from_file(&path)
    }

    /// Saves configuration to a file
    pub fn save_to_file(&self, path: &Path) -> MuseResult<()> {
        let content = toml::to_string(self)
            .map_err(|e| MuseError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                MuseError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        fs::write(path, content)
            .map_err(|e| MuseError::ConfigError(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Merges this config with another config, preferring values from the other config if present
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            api_key: other.api_key.clone().or_else(|| self.api_key.clone()),
            model_name: other.model_name.clone().or_else(|| self.model_name.clone()),
            base_url: other.base_url.clone().or_else(|| self.base_url.clone()),
            timeout_secs: other.timeout_secs.or(self.timeout_secs),
            backoff_ms: other.backoff_ms.or(self.backoff_ms),
            font_path: other.font_path.clone().or_else(|| self.font_path.clone()),
        }
    }

    /// Resolves the credential: the config file first, then `OPENAI_API_KEY`
    /// (after loading a `.env` file if one is present). Blank values count as missing.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = non_blank(self.api_key.as_deref()) {
            return Some(key);
        }
        dotenvy::dotenv().ok();
        non_blank(std::env::var(API_KEY_ENV).ok().as_deref())
    }

    pub fn model(&self) -> &str {
        self.model_name.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms.unwrap_or(DEFAULT_BACKOFF_MS))
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Helper function to get default config directory
pub fn get_default_config_dir(app_name: &str) -> MuseResult<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| {
        MuseError::ConfigError("Could not determine home directory".to_string())
    })?;

    Ok(home_dir.join(".config").join(app_name))
}

/// Helper function to get default config file path
pub fn get_default_config_file(app_name: &str) -> MuseResult<PathBuf> {
    let config_dir = get_default_config_dir(app_name)?;
    Ok(config_dir.join("config.toml"))
}
