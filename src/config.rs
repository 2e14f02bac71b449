//! Runtime settings resolved from the environment.
//!
//! `.env` is loaded first (if present), then the process environment is read.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::exchange::{ExchangeError, HttpTransport, WalletSigner};
use crate::logging::{FileLogConfig, LogConfig, LogLevel};
use crate::validation::DEFAULT_MAX_LEVERAGE;

pub const TESTNET_URL: &str = "https://api.testnet.hyperliquid.xyz";
pub const MAINNET_URL: &str = "https://api.hyperliquid.xyz";

/// Errors that can occur while resolving settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid LOG_LEVEL '{0}'. Expected one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

/// Trading client settings.
#[derive(Clone)]
pub struct Settings {
    pub testnet: bool,
    pub base_url: String,
    private_key: String,
    /// Leverage applied when an order does not specify one
    pub default_leverage: u32,
    pub max_leverage: u32,
    pub max_position_size: Decimal,
    /// Minimum spread as a fraction (0.001 = 0.1%)
    pub min_spread: Decimal,
    pub log_level: LogLevel,
    /// Directory for rotated log files; empty disables file logging
    pub log_dir: String,
    pub log_file: String,
}

impl Settings {
    /// Load `.env` and resolve settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings through an arbitrary variable lookup.
    ///
    /// # Variables
    /// - `TESTNET` - "true" (any case) selects testnet; default true
    /// - `BASE_URL` - overrides the URL implied by `TESTNET`
    /// - `PRIVATE_KEY` - hex signing key; default empty
    /// - `DEFAULT_LEVERAGE` - default 10
    /// - `LOG_LEVEL` - default INFO
    /// - `LOG_DIR` - default `logs`; empty disables file logging
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let testnet = lookup("TESTNET")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(true);

        let base_url = lookup("BASE_URL").unwrap_or_else(|| {
            let url = if testnet { TESTNET_URL } else { MAINNET_URL };
            url.to_string()
        });

        let default_leverage = match lookup("DEFAULT_LEVERAGE") {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "DEFAULT_LEVERAGE",
                value: v.clone(),
            })?,
            None => 10,
        };

        let log_level = match lookup("LOG_LEVEL") {
            Some(v) => v.parse().map_err(|_| ConfigError::InvalidLogLevel(v.clone()))?,
            None => LogLevel::Info,
        };

        Ok(Self {
            testnet,
            base_url,
            private_key: lookup("PRIVATE_KEY").unwrap_or_default(),
            default_leverage,
            max_leverage: DEFAULT_MAX_LEVERAGE,
            max_position_size: Decimal::ONE,
            min_spread: Decimal::new(1, 3),
            log_level,
            log_dir: lookup("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
            log_file: "bot.log".to_string(),
        })
    }

    pub fn has_private_key(&self) -> bool {
        !self.private_key.is_empty()
    }

    /// Build the action signer from `PRIVATE_KEY`.
    pub fn signer(&self) -> Result<WalletSigner, ExchangeError> {
        WalletSigner::from_hex(&self.private_key)
    }

    /// Build the REST transport for `base_url`.
    pub fn transport(&self) -> Result<HttpTransport, ExchangeError> {
        HttpTransport::new(self.base_url.clone())
    }

    /// Console logging at `log_level`, plus `log_dir/log_file` unless
    /// `log_dir` is empty.
    pub fn log_config(&self) -> LogConfig {
        let config = LogConfig::with_level(self.log_level);
        if self.log_dir.is_empty() {
            config
        } else {
            config.with_file(FileLogConfig::new(&self.log_dir, &self.log_file))
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("testnet", &self.testnet)
            .field("base_url", &self.base_url)
            .field(
                "private_key",
                &if self.has_private_key() { "<redacted>" } else { "<unset>" },
            )
            .field("default_leverage", &self.default_leverage)
            .field("max_leverage", &self.max_leverage)
            .field("max_position_size", &self.max_position_size)
            .field("min_spread", &self.min_spread)
            .field("log_level", &self.log_level)
            .field("log_dir", &self.log_dir)
            .field("log_file", &self.log_file)
            .finish()
    }
}
