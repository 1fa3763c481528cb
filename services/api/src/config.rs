//! API service configuration

use budget::notify::EXPO_PUSH_ENDPOINT;
use config::{Config as ConfigLoader, ConfigError, Environment};
use serde::Deserialize;

/// Listener and push settings for the API service
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Expo push endpoint used for budget alerts
    pub push_endpoint: String,
    /// When false, alerts are still recorded but no push is sent
    pub push_enabled: bool,
}

impl ApiConfig {
    /// Load configuration from built-in defaults overridden by `API__*` variables
    pub fn load() -> Result<Self, ConfigError> {
        ConfigLoader::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 5000)?
            .set_default("push_endpoint", EXPO_PUSH_ENDPOINT)?
            .set_default("push_enabled", true)?
            .add_source(
                Environment::with_prefix("API")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
