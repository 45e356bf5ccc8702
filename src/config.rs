use std::collections::HashMap;

use alloy_primitives::Address;
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub rpc_url: Url,
    pub controller_address: Address,
    pub network: String,
    pub balance_mode: BalanceMode,
    pub refresh_interval_ms: u64,
    pub price_api_url: String,
}

/// How balance resolution obtains current order reserves.
///
/// `Cached` serves the reserves embedded at the last discovery cycle (stale
/// up to one refresh interval). `Live` re-reads each owned strategy at call
/// time (fresh, one extra read per position).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceMode {
    Cached,
    Live,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let rpc_url = env_map
            .get("RPC_URL")
            .ok_or_else(|| ConfigError::MissingEnv("RPC_URL".to_string()))?
            .parse::<Url>()
            .map_err(|e| ConfigError::InvalidValue("RPC_URL".to_string(), e.to_string()))?;

        let controller_address = env_map
            .get("CONTROLLER_ADDRESS")
            .ok_or_else(|| ConfigError::MissingEnv("CONTROLLER_ADDRESS".to_string()))?
            .parse::<Address>()
            .map_err(|e| {
                ConfigError::InvalidValue("CONTROLLER_ADDRESS".to_string(), e.to_string())
            })?;

        let network = env_map
            .get("NETWORK")
            .cloned()
            .unwrap_or_else(|| "ethereum".to_string());

        let balance_mode = match env_map
            .get("BALANCE_MODE")
            .map(|s| s.as_str())
            .unwrap_or("live")
        {
            "cached" => BalanceMode::Cached,
            "live" => BalanceMode::Live,
            other => {
                return Err(ConfigError::InvalidValue(
                    "BALANCE_MODE".to_string(),
                    format!("must be cached or live, got {}", other),
                ))
            }
        };

        let refresh_interval_ms = env_map
            .get("REFRESH_INTERVAL_MS")
            .map(|s| s.as_str())
            .unwrap_or("300000")
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "REFRESH_INTERVAL_MS".to_string(),
                    "must be a valid u64".to_string(),
                )
            })?;

        let price_api_url = env_map
            .get("PRICE_API_URL")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("PRICE_API_URL".to_string()))?;

        Ok(Config {
            port,
            database_path,
            rpc_url,
            controller_address,
            network,
            balance_mode,
            refresh_interval_ms,
            price_api_url,
        })
    }
}
