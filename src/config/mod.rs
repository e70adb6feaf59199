use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default remote API root
pub const DEFAULT_BASE_URL: &str = "https://sugarytestapi.azurewebsites.net/";
pub const DEFAULT_LIST_PATH: &str = "TestApi/GetComplains";
pub const DEFAULT_SAVE_PATH: &str = "TestApi/SaveComplain";

/// Optional colour overrides, as `#RRGGBB` or `#RGB`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ThemeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub danger: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_dim: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Root of the complaints API, joined with the endpoint paths
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_list_path")]
    pub list_path: String,

    #[serde(default = "default_save_path")]
    pub save_path: String,

    #[serde(default)]
    pub theme: ThemeConfig,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_list_path() -> String {
    DEFAULT_LIST_PATH.to_string()
}

fn default_save_path() -> String {
    DEFAULT_SAVE_PATH.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            list_path: default_list_path(),
            save_path: default_save_path(),
            theme: ThemeConfig::default(),
        }
    }
}

impl AppConfig {
    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("complaint-board");

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from the default location, or create it
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Ok(path) => Self::load_from(&path),
            Err(_) => Ok(AppConfig::default()),
        }
    }

    /// Load config from `path`. A missing file is created with defaults;
    /// an unreadable or malformed one falls back to defaults with a warning.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return Ok(config),
                    Err(e) => tracing::warn!("Failed to parse config {}: {}", path.display(), e),
                },
                Err(e) => tracing::warn!("Failed to read config {}: {}", path.display(), e),
            }
            return Ok(AppConfig::default());
        }

        let config = AppConfig::default();
        if let Err(e) = config.save_to(path) {
            tracing::warn!("Could not write default config: {}", e);
        }
        Ok(config)
    }

    /// Save config to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Apply a command-line base URL override
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.base_url = url;
        }
        self
    }
}
