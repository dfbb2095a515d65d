//! Application configuration module
//!
//! Provides the validated configuration consumed by the session store,
//! the gateway client and the favorites synchronizer.

use reqwest::Url;
use std::path::PathBuf;
use thiserror::Error;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the remote catalog service
    pub api_url: Url,
    /// File backing the client-local key-value store
    pub store_path: PathBuf,
    /// Undo an optimistic favorite mutation when the remote call fails
    pub rollback_on_failure: bool,
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.api_url.scheme() {
            "http" | "https" => {}
            other => return Err(ConfigError::InvalidUrl(format!("unsupported scheme '{}'", other))),
        }
        if self.api_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl(self.api_url.to_string()));
        }
        if self.store_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingValue("store_path"));
        }
        Ok(())
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    api_url: Option<String>,
    store_path: Option<PathBuf>,
    rollback_on_failure: bool,
}

impl AppConfigBuilder {
    /// Set the remote service base URL
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// Set the local store file
    pub fn store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = Some(path.into());
        self
    }

    pub fn rollback_on_failure(mut self, enabled: bool) -> Self {
        self.rollback_on_failure = enabled;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let raw_url = self.api_url.ok_or(ConfigError::MissingValue("api_url"))?;
        let api_url = Url::parse(&raw_url).map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", raw_url, e)))?;
        let store_path = self.store_path.ok_or(ConfigError::MissingValue("store_path"))?;

        let config = AppConfig {
            api_url,
            store_path,
            rollback_on_failure: self.rollback_on_failure,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
}
