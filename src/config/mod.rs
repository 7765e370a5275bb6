//! Configuration and credential storage

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::auth::tokens::TokenStore;

const DEFAULT_PORTAL_URL: &str = "https://portal.example.org/api";

/// Application configuration
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the portal API (set via `login --portal`)
    pub portal_url: Option<String>,
    /// Stored access token
    pub access_token: Option<String>,
    /// Stored refresh token
    pub refresh_token: Option<String>,
}

impl Config {
    /// Get config directory path
    fn config_dir() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "parish-cli", "parish-cli")
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

        // Set restrictive permissions on config file (contains tokens)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&path, perms).context("Failed to set config permissions")?;
        }

        Ok(())
    }

    /// Portal base URL, falling back to the default instance.
    pub fn portal_url(&self) -> String {
        self.portal_url
            .clone()
            .unwrap_or_else(|| DEFAULT_PORTAL_URL.to_string())
    }

    pub fn clear_tokens(&mut self) {
        self.access_token = None;
        self.refresh_token = None;
    }
}

/// File-backed token store: every credential write persists the config, so a
/// token pair rotated mid-session survives the process.
pub struct ConfigTokenStore {
    inner: Mutex<Config>,
}

impl ConfigTokenStore {
    pub fn new(config: Config) -> Self {
        Self {
            inner: Mutex::new(config),
        }
    }

    fn persist(config: &Config) {
        if let Err(e) = config.save() {
            tracing::warn!("Failed to persist credentials: {:#}", e);
        }
    }
}

impl TokenStore for ConfigTokenStore {
    fn token(&self) -> Option<String> {
        self.inner.lock().expect("config lock").access_token.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.inner
            .lock()
            .expect("config lock")
            .refresh_token
            .clone()
    }

    fn set_token(&self, token: String) {
        let mut config = self.inner.lock().expect("config lock");
        config.access_token = Some(token);
        Self::persist(&config);
    }

    fn set_refresh_token(&self, token: String) {
        let mut config = self.inner.lock().expect("config lock");
        config.refresh_token = Some(token);
        Self::persist(&config);
    }

    fn clear_all(&self) {
        let mut config = self.inner.lock().expect("config lock");
        config.clear_tokens();
        Self::persist(&config);
    }
}
