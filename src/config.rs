use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::domain::wallet::validate_currency;

pub const DEFAULT_PAYSTACK_BASE_URL: &str = "https://api.paystack.co";
pub const DEFAULT_CURRENCY: &str = "GHS";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Clone)]
pub struct PaystackConfig {
    pub secret_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

// Keep the secret out of logs.
impl fmt::Debug for PaystackConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaystackConfig")
            .field("secret_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub paystack: PaystackConfig,
    pub wallet_currency: String,
}

impl AppConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &'static str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "PORT",
                reason: format!("{e}"),
            })?,
            None => 8080,
        };
        let timeout_secs = match get("PAYSTACK_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
                name: "PAYSTACK_TIMEOUT_SECS",
                reason: format!("{e}"),
            })?,
            None => 30,
        };
        let wallet_currency =
            get("WALLET_CURRENCY").unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
        validate_currency(&wallet_currency).map_err(|e| ConfigError::Invalid {
            name: "WALLET_CURRENCY",
            reason: e.to_string(),
        })?;

        Ok(AppConfig {
            database_url: require("DATABASE_URL")?,
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            paystack: PaystackConfig {
                secret_key: require("PAYSTACK_SECRET_KEY")?,
                base_url: get("PAYSTACK_BASE_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| DEFAULT_PAYSTACK_BASE_URL.to_string()),
                timeout: Duration::from_secs(timeout_secs),
            },
            wallet_currency,
        })
    }
}
