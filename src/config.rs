//! Gateway configuration.
//!
//! Loaded once at startup from TOML; nothing here is hot-reloaded.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::api::parse_node_addr;
use crate::coin::{btc, skycoin};
use crate::error::{GatewayError, GatewayResult};
use crate::utils::TransportSettings;
use crate::wallet::DeriverConfig;

/// Environment variable that forces the hide-secret-key flag on
pub const HIDE_SECKEY_ENV: &str = "UTXO_GATEWAY_HIDE_SECKEY";

/// Skycoin node settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkycoinConfig {
    /// Node REST endpoint as `host:port`
    #[serde(default = "default_skycoin_node_addr")]
    pub node_addr: String,
}

/// Esplora endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BitcoinConfig {
    /// Esplora REST endpoint as `host:port`
    #[serde(default = "default_bitcoin_node_addr")]
    pub node_addr: String,

    /// bitcoin, testnet, signet or regtest
    #[serde(default = "default_bitcoin_network")]
    pub network: String,
}

impl BitcoinConfig {
    pub fn network(&self) -> GatewayResult<bitcoin::Network> {
        bitcoin::Network::from_str(&self.network).map_err(|e| {
            GatewayError::invalid_argument(format!("Unknown bitcoin network '{}': {}", self.network, e))
        })
    }
}

impl Default for BitcoinConfig {
    fn default() -> Self {
        Self {
            node_addr: default_bitcoin_node_addr(),
            network: default_bitcoin_network(),
        }
    }
}

/// Gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Omit secret keys from generated address entries
    #[serde(default)]
    pub hide_secret_key: bool,

    /// Whole-request timeout for backend calls, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Connect timeout for backend calls, in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Skycoin backend; absent disables the coin
    pub skycoin: Option<SkycoinConfig>,

    /// Bitcoin backend; absent disables the coin
    pub bitcoin: Option<BitcoinConfig>,
}

fn default_skycoin_node_addr() -> String {
    skycoin::DEFAULT_NODE_ADDR.to_string()
}

fn default_bitcoin_node_addr() -> String {
    btc::DEFAULT_NODE_ADDR.to_string()
}

fn default_bitcoin_network() -> String {
    "bitcoin".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            hide_secret_key: false,
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            skycoin: Some(SkycoinConfig {
                node_addr: default_skycoin_node_addr(),
            }),
            bitcoin: None,
        }
    }
}

impl GatewayConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: GatewayConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Force the hide flag on when the environment asks for it.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var(HIDE_SECKEY_ENV) {
            if matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes") {
                self.hide_secret_key = true;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }
        if self.connect_timeout_secs == 0 {
            anyhow::bail!("connect_timeout_secs must be greater than 0");
        }
        if self.connect_timeout_secs > self.request_timeout_secs {
            tracing::warn!(
                "connect_timeout_secs ({}) exceeds request_timeout_secs ({})",
                self.connect_timeout_secs,
                self.request_timeout_secs
            );
        }

        if let Some(sky) = &self.skycoin {
            parse_node_addr(&sky.node_addr)
                .map_err(|e| anyhow::anyhow!("skycoin.node_addr: {}", e.message))?;
        }
        if let Some(btc) = &self.bitcoin {
            parse_node_addr(&btc.node_addr)
                .map_err(|e| anyhow::anyhow!("bitcoin.node_addr: {}", e.message))?;
            btc.network()
                .map_err(|e| anyhow::anyhow!("bitcoin.network: {}", e.message))?;
        }

        if self.skycoin.is_none() && self.bitcoin.is_none() {
            tracing::warn!("No coin backend configured; every request will fail");
        }
        Ok(())
    }

    pub fn transport_settings(&self) -> TransportSettings {
        TransportSettings {
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
        }
    }

    pub fn deriver_config(&self) -> DeriverConfig {
        DeriverConfig {
            hide_secret_key: self.hide_secret_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GatewayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.skycoin.as_ref().unwrap().node_addr, "127.0.0.1:6420");
        assert!(!config.hide_secret_key);
    }

    #[test]
    fn test_parse_full_config() {
        let config = GatewayConfig::from_toml(
            r#"
            hide_secret_key = true
            request_timeout_secs = 15

            [skycoin]
            node_addr = "10.0.0.5:6420"

            [bitcoin]
            node_addr = "10.0.0.6:3000"
            network = "testnet"
            "#,
        )
        .unwrap();

        assert!(config.hide_secret_key);
        assert!(config.deriver_config().hide_secret_key);
        assert_eq!(config.transport_settings().request_timeout, Duration::from_secs(15));
        assert_eq!(config.connect_timeout_secs, 10);
        assert_eq!(config.skycoin.unwrap().node_addr, "10.0.0.5:6420");
        assert_eq!(config.bitcoin.unwrap().network().unwrap(), bitcoin::Network::Testnet);
    }

    #[test]
    fn test_omitted_section_disables_coin() {
        let config = GatewayConfig::from_toml("[bitcoin]\n").unwrap();
        assert!(config.skycoin.is_none());
        assert_eq!(config.bitcoin.unwrap(), BitcoinConfig::default());
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(GatewayConfig::from_toml("request_timeout_secs = 0").is_err());
        assert!(GatewayConfig::from_toml("[skycoin]\nnode_addr = \"http://x:1\"").is_err());
        assert!(GatewayConfig::from_toml("[bitcoin]\nnetwork = \"dogenet\"").is_err());
    }
}
