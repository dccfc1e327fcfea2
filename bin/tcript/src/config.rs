use alloy_primitives::Address;
use ::config::{NetworkConfig, NetworkConfigBuilder, NetworkType};
use indexer::DemandParams;
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::Path, path::PathBuf, time::Duration};

/// Top-level configuration shared by the wallet and indexer binaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Network preset (mainnet or testnet)
    #[serde(default = "default_network")]
    pub network: NetworkType,

    /// RPC endpoint url, defaults to the network's public endpoint
    #[serde(default)]
    pub rpc_url: Option<String>,

    /// Smart contract wallet address
    #[serde(default)]
    pub wallet_contract: Option<Address>,

    /// Token contract address
    #[serde(default)]
    pub token_contract: Option<Address>,

    /// Indexer state file
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,

    /// First block the indexer reads
    #[serde(default)]
    pub start_block: u64,

    /// Seconds between indexer cycles
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Blocks per log query
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u64,

    /// Prometheus listener, disabled when unset
    #[serde(default)]
    pub metrics_addr: Option<SocketAddr>,

    /// Claim endpoint the `interact` command posts to
    #[serde(default)]
    pub interact_url: Option<String>,

    /// Adaptive threshold state of the `demand` command
    #[serde(default = "default_msct_path")]
    pub msct_path: PathBuf,

    /// Weights and limits of the demand index
    #[serde(default)]
    pub demand: DemandParams,
}

const fn default_network() -> NetworkType {
    NetworkType::Testnet
}

fn default_state_path() -> PathBuf {
    PathBuf::from("state.json")
}

fn default_msct_path() -> PathBuf {
    PathBuf::from("msct_state.json")
}

const fn default_poll_interval_secs() -> u64 {
    30
}

const fn default_chunk_size() -> u64 {
    1_000
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> eyre::Result<Self> {
        let config: Self = toml::from_str(contents)?;

        if config.poll_interval_secs == 0 {
            eyre::bail!("poll_interval_secs must be greater than zero");
        }
        if config.demand.window_days == 0 {
            eyre::bail!("demand.window_days must be greater than zero");
        }

        Ok(config)
    }

    /// RPC url to connect to.
    pub fn rpc_url(&self) -> &str {
        self.rpc_url
            .as_deref()
            .unwrap_or_else(|| self.network.default_rpc_url())
    }

    /// Network preset with the configured contract addresses applied.
    pub fn network_config(&self) -> NetworkConfig {
        let mut builder = NetworkConfigBuilder::from_network_type(self.network);

        if let Some(wallet) = self.wallet_contract {
            builder = builder.wallet_contract(wallet);
        }
        if let Some(token) = self.token_contract {
            builder = builder.token_contract(token);
        }

        builder.build()
    }

    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}
