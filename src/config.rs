use std::fs;
use std::path::Path;
use std::time::Duration;

use bitcoin::Network;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::address::network_serde;
use crate::error::{Error, Result};
use crate::fee::FeePolicy;

/// Runtime settings, stored as JSON next to the binary.
///
/// The two fee constants are policy: integrations have used different
/// minimum relay fees, so neither is baked into the selection code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Base URL of the UTXO listing / broadcast API
    pub server_url: String,
    #[serde(with = "network_serde")]
    pub network: Network,
    /// Minimum fee for any transaction, in satoshis
    pub min_relay_fee: u64,
    /// Change headroom in multiples of the fee rate
    pub change_headroom_multiplier: u64,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        let policy = FeePolicy::default();
        Config {
            server_url: "http://127.0.0.1:3000".to_string(),
            network: Network::Testnet,
            min_relay_fee: policy.min_relay_fee,
            change_headroom_multiplier: policy.change_headroom_multiplier,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&json)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path` if it exists, otherwise returns the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            info!(path = %path.display(), "No config file found, using defaults");
            Ok(Config::default())
        }
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.server_url.trim().is_empty() {
            return Err(Error::Config("server_url must not be empty".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::Config("request_timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    pub fn fee_policy(&self) -> FeePolicy {
        FeePolicy {
            min_relay_fee: self.min_relay_fee,
            change_headroom_multiplier: self.change_headroom_multiplier,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
