//! Configuration infrastructure.
//!
//! Contains configuration loading and management for the closet: storage
//! location, HTTP client behavior, selector cascades, AI settings and
//! logging. The configuration lives as one JSON file in the user config
//! directory and is created with defaults on first run.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::info;

use crate::infrastructure::ai::AiConfig;
use crate::infrastructure::extraction::ExtractionSelectors;
use crate::infrastructure::http_client::HttpClientConfig;

const APP_DIR_NAME: &str = "virtual-closet";
const CONFIG_FILE_NAME: &str = "virtual_closet_config.json";
const STORE_FILE_NAME: &str = "closet.json";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Overrides the default data directory when set.
    pub data_dir: Option<PathBuf>,
    pub http: HttpClientConfig,
    pub extraction: ExtractionSelectors,
    pub ai: AiConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset, e.g. `info` or
    /// `virtual_closet=debug`.
    pub level: String,
    /// Also write log files into the data directory.
    pub file_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_output: false,
        }
    }
}

impl AppConfig {
    /// Path of the collection store file.
    pub fn store_path(&self) -> Result<PathBuf> {
        Ok(self.resolve_data_dir()?.join(STORE_FILE_NAME))
    }

    /// Directory for log files.
    pub fn log_dir(&self) -> Result<PathBuf> {
        Ok(self.resolve_data_dir()?.join("logs"))
    }

    fn resolve_data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => ConfigManager::get_app_data_dir(),
        }
    }
}

/// Loads and persists the application configuration file.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory.
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join(APP_DIR_NAME);
        Ok(config_dir)
    }

    /// Get the application data directory.
    pub fn get_app_data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .context("Failed to get user data directory")?
            .join(APP_DIR_NAME);
        Ok(data_dir)
    }

    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_dir()?.join(CONFIG_FILE_NAME);
        Ok(Self { config_path })
    }

    /// Explicit path, mainly for tests.
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Load the configuration, writing defaults on first run.
    pub async fn initialize_on_first_run(&self) -> Result<AppConfig> {
        let config_dir = self
            .config_path
            .parent()
            .context("Failed to get config directory")?;

        if !fs::try_exists(config_dir).await? {
            fs::create_dir_all(config_dir)
                .await
                .context("Failed to create config directory")?;
            info!("created configuration directory: {}", config_dir.display());
        }

        if fs::try_exists(&self.config_path).await? {
            self.load_config().await
        } else {
            info!("first run detected - writing default configuration");
            let default_config = AppConfig::default();
            self.save_config(&default_config).await?;
            Ok(default_config)
        }
    }

    pub async fn load_config(&self) -> Result<AppConfig> {
        let raw = fs::read_to_string(&self.config_path)
            .await
            .with_context(|| format!("Failed to read config file {}", self.config_path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", self.config_path.display()))?;
        Ok(config)
    }

    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        let raw = serde_json::to_string_pretty(config).context("Failed to serialize config")?;
        fs::write(&self.config_path, raw)
            .await
            .with_context(|| format!("Failed to write config file {}", self.config_path.display()))?;
        Ok(())
    }
}
