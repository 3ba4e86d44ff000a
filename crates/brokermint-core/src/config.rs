//! Application configuration management.
//!
//! This module handles loading and saving the console configuration:
//! service location, request timeout, which backend holds the session
//! record, and the last username used to sign in.
//!
//! Configuration is stored at `~/.config/brokermint/config.json`.
//! `BROKERMINT_API_URL` overrides the service location for a single run and
//! is never written back to the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::gateway::DEFAULT_TIMEOUT_SECS;
use crate::auth::{FileStore, KeyValueStore, KeyringStore};
use crate::models::{DEFAULT_AUDIT_LIMIT, DEFAULT_TICKERS};

/// Application name used for config/data directory paths
pub const APP_NAME: &str = "brokermint";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Where the compliance service listens when nothing else is configured
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

/// Environment variable overriding `api_base_url`
pub const API_URL_ENV: &str = "BROKERMINT_API_URL";

/// Backend holding the durable session record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Keyring,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub storage: StorageBackend,
    pub audit_limit: u32,
    pub default_tickers: String,
    pub last_username: Option<String>,
    /// Service location from the environment; wins over `api_base_url`
    #[serde(skip)]
    api_url_override: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            storage: StorageBackend::default(),
            audit_limit: DEFAULT_AUDIT_LIMIT,
            default_tickers: DEFAULT_TICKERS.to_string(),
            last_username: None,
            api_url_override: None,
        }
    }
}

impl Config {
    /// Load the saved config, falling back to defaults when the file is
    /// missing or unreadable. `BROKERMINT_API_URL` applies either way.
    pub fn load() -> Self {
        let saved = Self::config_path().and_then(|path| Self::load_from(&path));
        Self::resolve(saved, std::env::var(API_URL_ENV).ok())
    }

    fn resolve(saved: Result<Self>, api_url: Option<String>) -> Self {
        let mut config = saved.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load config, using defaults");
            Self::default()
        });
        if let Some(url) = api_url {
            config.override_api_url(&url);
        }
        config
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
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

    /// Use `url` for this run only. Blank values are ignored.
    pub fn override_api_url(&mut self, url: &str) {
        let url = url.trim();
        if !url.is_empty() {
            debug!(url = %url, "API base URL overridden from environment");
            self.api_url_override = Some(url.to_string());
        }
    }

    /// Service location requests are sent to
    pub fn api_base_url(&self) -> &str {
        self.api_url_override
            .as_deref()
            .unwrap_or(&self.api_base_url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Directory for log files
    pub fn log_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME).join("logs"))
    }

    /// Directory reports are saved into
    pub fn download_dir(&self) -> PathBuf {
        dirs::download_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Open the configured session store
    pub fn open_store(&self) -> Result<Box<dyn KeyValueStore>> {
        Ok(match self.storage {
            StorageBackend::File => Box::new(FileStore::default_location()?),
            StorageBackend::Keyring => Box::new(KeyringStore::new()),
        })
    }
}
