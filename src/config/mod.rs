//! Configuration management for the Casavia client
//!
//! This module loads configuration from environment variables with built-in
//! fallback defaults, so the client works against the public Sepolia
//! deployment out of the box.

use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::units::is_valid_address;

/// Default Sepolia JSON-RPC endpoint
pub const DEFAULT_RPC_URL: &str = "https://ethereum-sepolia-rpc.publicnode.com";

/// Address of the deployed PropertyRental contract on Sepolia
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x01A2B32ba4B68F4B621133C77bAD97C6D43F8305";

/// Sepolia chain id
pub const DEFAULT_CHAIN_ID: u64 = 11_155_111;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Invalid contract address: {0}")]
    InvalidContractAddress(String),
}

/// Which listing data source the application runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSourceKind {
    /// In-memory fixture store, no chain access
    Local,
    /// Live reads/writes against the deployed contract
    LiveContract,
}

impl DataSourceKind {
    /// Parse data source kind from string
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().as_str() {
            "local" | "demo" => Ok(DataSourceKind::Local),
            "live" | "contract" => Ok(DataSourceKind::LiveContract),
            _ => Err(ConfigError::InvalidValue(format!(
                "Invalid data source: '{}'. Expected: local or live",
                s
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataSourceKind::Local => "local",
            DataSourceKind::LiveContract => "live",
        }
    }
}

impl Default for DataSourceKind {
    fn default() -> Self {
        DataSourceKind::Local
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Ethereum JSON-RPC endpoint URL
    pub eth_rpc_url: String,

    /// Deployed PropertyRental contract address
    pub contract_address: String,

    /// Chain id attached to every transaction request
    pub chain_id: u64,

    /// Selected data source
    pub data_source: DataSourceKind,

    /// How long a cached query result counts as fresh
    pub query_stale_after: Duration,

    /// Background re-fetch interval for cached queries
    pub query_refresh_every: Duration,

    /// Receipt polling interval while a transaction is confirming
    pub confirm_poll_every: Duration,

    /// Give up waiting for a receipt after this long
    pub confirm_timeout: Duration,

    /// Log level (RUST_LOG)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors)
        dotenvy::dotenv().ok();

        let eth_rpc_url =
            env::var("ETH_RPC_URL").unwrap_or_else(|_| DEFAULT_RPC_URL.to_string());

        let contract_address = env::var("RENTAL_CONTRACT_ADDRESS")
            .unwrap_or_else(|_| DEFAULT_CONTRACT_ADDRESS.to_string());
        if !is_valid_address(&contract_address) {
            return Err(ConfigError::InvalidContractAddress(contract_address));
        }

        let chain_id = env::var("CHAIN_ID")
            .unwrap_or_else(|_| DEFAULT_CHAIN_ID.to_string())
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::InvalidValue("CHAIN_ID must be a valid number".to_string())
            })?;

        let data_source = env::var("DATA_SOURCE")
            .map(|s| DataSourceKind::from_str(&s))
            .unwrap_or(Ok(DataSourceKind::default()))?;

        let query_stale_after = duration_var("LISTING_STALE_SECS", 20);
        let query_refresh_every = duration_var("LISTING_REFRESH_SECS", 30);
        let confirm_poll_every = duration_var("CONFIRM_POLL_SECS", 2);
        let confirm_timeout = duration_var("CONFIRM_TIMEOUT_SECS", 120);

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(Config {
            eth_rpc_url,
            contract_address,
            chain_id,
            data_source,
            query_stale_after,
            query_refresh_every,
            confirm_poll_every,
            confirm_timeout,
            log_level,
        })
    }
}

fn duration_var(name: &str, default_secs: u64) -> Duration {
    let secs = env::var(name)
        .unwrap_or_else(|_| default_secs.to_string())
        .parse::<u64>()
        .unwrap_or(default_secs);
    Duration::from_secs(secs)
}
