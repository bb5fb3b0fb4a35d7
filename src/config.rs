use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

/// Backend used when neither the env var nor the config file names one.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

/// Env var that overrides the configured backend base URL.
pub const SERVER_URL_ENV: &str = "INSIGHTS_SERVER_URL";

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub server_url: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the config, seeding the file with the default server URL on
    /// first run so there is a file for users to edit.
    pub fn load_or_init() -> Result<Self> {
        Self::load_or_init_from(&Self::config_path()?)
    }

    fn load_or_init_from(path: &Path) -> Result<Self> {
        let mut config = Self::load_from(path)?;
        if config.server_url.is_none() {
            config.server_url = Some(DEFAULT_SERVER_URL.to_string());
            config.save_to(path)?;
        }
        Ok(config)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Resolved backend base URL: env var, then config file, then default.
    pub fn resolve_server_url(&self) -> String {
        std::env::var(SERVER_URL_ENV)
            .ok()
            .filter(|url| !url.is_empty())
            .or_else(|| self.server_url.clone())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("insights").join("config.json"))
    }
}
