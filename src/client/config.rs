use crate::shared::config::{AppConfig, AppConfigBuilder, ConfigError};

/// Default server URL
const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// Environment variable holding the server base URL
pub const SERVER_URL_ENV: &str = "RDM_SERVER_URL";

/// Client configuration wrapper.
#[derive(Debug, Clone)]
pub struct Config {
    app: AppConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app: AppConfig {
                server_url: DEFAULT_SERVER_URL.to_string(),
            },
        }
    }
}

impl Config {
    /// Load from the environment (and `.env` when present)
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        let server_url =
            std::env::var(SERVER_URL_ENV).unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());
        Self::with_builder(AppConfig::builder().server_url(server_url))
    }

    /// Build from an explicit server URL
    pub fn new(server_url: impl Into<String>) -> Result<Self, ConfigError> {
        Self::with_builder(AppConfig::builder().server_url(server_url))
    }

    pub fn with_builder(builder: AppConfigBuilder) -> Result<Self, ConfigError> {
        let app = builder.build()?;
        tracing::debug!(server_url = %app.server_url, "client configuration loaded");
        Ok(Self { app })
    }

    pub fn app(&self) -> &AppConfig {
        &self.app
    }

    pub fn server_url(&self) -> &str {
        &self.app.server_url
    }

    /// Get the full URL for an API path
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.server_url(), path)
    }

    /// URL of an RPC procedure
    pub fn rpc_url(&self, namespace: &str, method: &str) -> String {
        self.api_url(&format!("/rpc/{}/{}", namespace, method))
    }

    /// Server-Sent Events endpoint
    pub fn sse_url(&self) -> String {
        self.api_url("/events")
    }

    /// WebSocket endpoint, with the scheme mapped http->ws and https->wss
    pub fn websocket_url(&self) -> String {
        let base = self.server_url();
        let ws_base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            base.to_string()
        };
        format!("{}/ws", ws_base)
    }
}
