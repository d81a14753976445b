//! Configuration Management
//!
//! Handles persistent configuration storage for do-logsink.

use crate::digitalocean::client::DEFAULT_API_URL;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variables checked for the API token, in order
pub const TOKEN_ENV_VARS: &[&str] = &["DIGITALOCEAN_TOKEN", "DIGITALOCEAN_ACCESS_TOKEN"];

pub const API_URL_ENV_VAR: &str = "DIGITALOCEAN_API_URL";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// API base URL override
    #[serde(default)]
    pub api_url: Option<String>,
    /// API token
    #[serde(default)]
    pub token: Option<String>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("do-logsink").join("config.json"))
    }

    /// Load configuration from the default location
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from `path`; a missing or unreadable file yields defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;

        Ok(())
    }

    /// Get effective token (CLI > environment > config)
    pub fn effective_token(&self, cli: Option<&str>) -> Option<String> {
        cli.map(str::to_string)
            .or_else(|| {
                TOKEN_ENV_VARS
                    .iter()
                    .find_map(|var| std::env::var(var).ok())
            })
            .or_else(|| self.token.clone())
            .filter(|t| !t.trim().is_empty())
    }

    /// Get effective API URL (CLI > environment > config > public endpoint)
    pub fn effective_api_url(&self, cli: Option<&str>) -> String {
        cli.map(str::to_string)
            .or_else(|| std::env::var(API_URL_ENV_VAR).ok())
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            api_url: Some("https://api.example.com".into()),
            token: Some("dop_v1_test".into()),
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path), config);
    }

    #[test]
    fn test_missing_or_malformed_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        assert_eq!(Config::load_from(&missing), Config::default());

        let malformed = dir.path().join("bad.json");
        std::fs::write(&malformed, "{not json").unwrap();
        assert_eq!(Config::load_from(&malformed), Config::default());
    }

    #[test]
    fn test_cli_values_take_precedence() {
        let config = Config {
            api_url: Some("https://from-config".into()),
            token: Some("config-token".into()),
        };
        assert_eq!(
            config.effective_token(Some("cli-token")).as_deref(),
            Some("cli-token")
        );
        assert_eq!(
            config.effective_api_url(Some("https://from-cli")),
            "https://from-cli"
        );
    }
}
