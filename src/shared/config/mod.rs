//! Application configuration module
//!
//! Provides the validated server configuration. The server URL goes through
//! [`normalize_server_url`] before validation, so `localhost` never reaches
//! the resolver (it can stall on IPv6 lookups).

use reqwest::Url;
use thiserror::Error;

/// Rewrite the first `localhost` in a server URL to `127.0.0.1`.
pub fn normalize_server_url(url: &str) -> String {
    url.replacen("localhost", "127.0.0.1", 1)
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Normalized server base URL, without trailing slash
    pub server_url: String,
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.server_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", self.server_url, e)))?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ConfigError::InvalidUrl(format!(
                "unsupported scheme '{}' in {}",
                other, self.server_url
            ))),
        }
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    server_url: Option<String>,
}

impl AppConfigBuilder {
    /// Set the server URL
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let raw = self.server_url.ok_or(ConfigError::MissingValue("server_url"))?;
        let config = AppConfig {
            server_url: normalize_server_url(raw.trim()).trim_end_matches('/').to_string(),
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
