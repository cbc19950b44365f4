//! Configuration storage

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Backend origin used when nothing else is configured.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8888";

/// Environment variable overriding the configured server.
pub const SERVER_ENV: &str = "DOCGENIE_SERVER";

/// Application configuration
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Backend origin, e.g. "http://127.0.0.1:8888"
    pub server_url: Option<String>,
    /// User id from the last successful login
    pub last_user_id: Option<i64>,
}

impl Config {
    /// Get config directory path
    fn config_dir() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "docgenie", "docgenie")
            .context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }

    /// Get config file path
    fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from disk
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir).context("Failed to create config directory")?;

        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, content).context("Failed to write config file")?;
        tracing::debug!("Saved config to {}", path.display());

        Ok(())
    }

    /// Resolve the backend origin: flag, then environment, then file, then default.
    pub fn server_url(&self, flag: Option<&str>) -> String {
        let env = std::env::var(SERVER_ENV).ok();
        resolve_server_url(flag, env.as_deref(), self.server_url.as_deref())
    }

    /// Remember the user id from a successful login.
    pub fn remember_user(&mut self, user_id: i64) -> Result<()> {
        self.last_user_id = Some(user_id);
        self.save()
    }

    /// Forget the remembered user.
    pub fn forget_user(&mut self) -> Result<()> {
        self.last_user_id = None;
        self.save()
    }
}

fn resolve_server_url(flag: Option<&str>, env: Option<&str>, file: Option<&str>) -> String {
    [flag, env, file]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SERVER_URL)
        .to_string()
}
