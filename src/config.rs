//! Client configuration.
//!
//! Recognized options are the API base address and the request timeout.
//! Configuration is stored at `~/.config/handbook-client/config.json`;
//! `HANDBOOK_API_BASE_URL` and `HANDBOOK_API_TIMEOUT_MS` override the
//! stored values at load time.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for the config directory path
const APP_NAME: &str = "handbook-client";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Fallback API base address
const DEFAULT_BASE_URL: &str = "https://api.example.com";

/// Request timeout in milliseconds.
/// 20s tolerates slow mobile networks while still failing fast enough
/// for the UI to react.
const DEFAULT_TIMEOUT_MS: u64 = 20_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config: Self = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };

        if let Ok(base_url) = std::env::var("HANDBOOK_API_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(timeout_ms) = std::env::var("HANDBOOK_API_TIMEOUT_MS")
            .ok()
            .and_then(|raw| raw.parse().ok())
        {
            config.timeout_ms = timeout_ms;
        }

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_the_backend_contract() {
        let config = Config::default();
        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.timeout_ms, 20_000);
    }

    #[test]
    fn partial_config_files_fall_back_to_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"base_url":"https://staging.example.com"}"#).expect("parse");
        assert_eq!(config.base_url, "https://staging.example.com");
        assert_eq!(config.timeout_ms, 20_000);
    }
}
