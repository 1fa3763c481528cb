//! Authentication service configuration

use budget::notify::EXPO_PUSH_ENDPOINT;
use config::{Config as ConfigLoader, ConfigError, Environment};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub host: String,
    pub port: u16,
    /// Lifetime of a signup code
    pub otp_ttl_seconds: u64,
    pub push_endpoint: String,
    pub push_enabled: bool,
}

impl AuthConfig {
    /// Load configuration from built-in defaults overridden by `AUTH__*` variables
    pub fn load() -> Result<Self, ConfigError> {
        ConfigLoader::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 5001)?
            .set_default("otp_ttl_seconds", 300)?
            .set_default("push_endpoint", EXPO_PUSH_ENDPOINT)?
            .set_default("push_enabled", true)?
            .add_source(
                Environment::with_prefix("AUTH")
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

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    #[test]
    #[serial]
    fn test_defaults_and_overrides() {
        unsafe {
            env::remove_var("AUTH__PORT");
            env::remove_var("AUTH__OTP_TTL_SECONDS");
        }
        let config = AuthConfig::load().unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:5001");
        assert_eq!(config.otp_ttl_seconds, 300);

        unsafe {
            env::set_var("AUTH__OTP_TTL_SECONDS", "60");
        }
        let config = AuthConfig::load().unwrap();
        assert_eq!(config.otp_ttl_seconds, 60);

        unsafe {
            env::remove_var("AUTH__OTP_TTL_SECONDS");
        }
    }
}
