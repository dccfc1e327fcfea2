//! Network configuration for wallet and token interactions.
//!
//! Provides chain parameters for the supported zkSync Era networks and the
//! addresses of the deployed wallet and token contracts.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A contract address was left unset (zero address)
    #[error("{0} contract address is not configured")]
    MissingContract(&'static str),
}

/// Network type (mainnet or testnet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    Mainnet,
    Testnet,
}

impl NetworkType {
    /// Public RPC endpoint used when no url is configured.
    pub const fn default_rpc_url(self) -> &'static str {
        match self {
            Self::Mainnet => "https://mainnet.era.zksync.io",
            Self::Testnet => "https://sepolia.era.zksync.dev",
        }
    }

    /// Block explorer base url.
    pub const fn explorer_url(self) -> &'static str {
        match self {
            Self::Mainnet => "https://explorer.zksync.io",
            Self::Testnet => "https://sepolia.explorer.zksync.io",
        }
    }
}

/// Chain parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Chain ID
    pub chain_id: u64,
}

impl ChainConfig {
    /// zkSync Era mainnet.
    pub const fn zksync_era() -> Self {
        Self {
            chain_id: 324,
        }
    }

    /// zkSync Era Sepolia testnet.
    pub const fn zksync_sepolia() -> Self {
        Self {
            chain_id: 300,
        }
    }
}

/// Deployed contract addresses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractsConfig {
    /// Smart contract wallet (fund / withdraw)
    pub wallet: Address,
    /// ERC20 token
    pub token: Address,
}

impl ContractsConfig {
    /// No contracts deployed yet; both addresses must be overridden.
    pub const fn unset() -> Self {
        Self {
            wallet: Address::ZERO,
            token: Address::ZERO,
        }
    }
}

/// Complete network configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network type (mainnet or testnet)
    pub network_type: NetworkType,
    /// Chain parameters
    pub chain: ChainConfig,
    /// Contract addresses
    pub contracts: ContractsConfig,
}

impl NetworkConfig {
    /// Create mainnet configuration.
    pub const fn mainnet() -> Self {
        Self {
            network_type: NetworkType::Mainnet,
            chain: ChainConfig::zksync_era(),
            contracts: ContractsConfig::unset(),
        }
    }

    /// Create testnet (Sepolia) configuration.
    pub const fn sepolia() -> Self {
        Self {
            network_type: NetworkType::Testnet,
            chain: ChainConfig::zksync_sepolia(),
            contracts: ContractsConfig::unset(),
        }
    }

    /// Create configuration from network type.
    pub const fn from_network_type(network_type: NetworkType) -> Self {
        match network_type {
            NetworkType::Mainnet => Self::mainnet(),
            NetworkType::Testnet => Self::sepolia(),
        }
    }

    /// Ensure the wallet contract address is set.
    pub fn wallet_contract(&self) -> Result<Address, ConfigError> {
        if self.contracts.wallet.is_zero() {
            return Err(ConfigError::MissingContract("wallet"));
        }
        Ok(self.contracts.wallet)
    }

    /// Ensure the token contract address is set.
    pub fn token_contract(&self) -> Result<Address, ConfigError> {
        if self.contracts.token.is_zero() {
            return Err(ConfigError::MissingContract("token"));
        }
        Ok(self.contracts.token)
    }
}

/// Builder for custom network configurations.
#[derive(Debug, Clone)]
pub struct NetworkConfigBuilder {
    network_type: NetworkType,
    chain: ChainConfig,
    contracts: ContractsConfig,
}

impl NetworkConfigBuilder {
    /// Start with mainnet defaults.
    pub const fn mainnet() -> Self {
        Self {
            network_type: NetworkType::Mainnet,
            chain: ChainConfig::zksync_era(),
            contracts: ContractsConfig::unset(),
        }
    }

    /// Start with testnet defaults.
    pub const fn testnet() -> Self {
        Self {
            network_type: NetworkType::Testnet,
            chain: ChainConfig::zksync_sepolia(),
            contracts: ContractsConfig::unset(),
        }
    }

    /// Start from the defaults of a network type.
    pub const fn from_network_type(network_type: NetworkType) -> Self {
        match network_type {
            NetworkType::Mainnet => Self::mainnet(),
            NetworkType::Testnet => Self::testnet(),
        }
    }

    /// Override the wallet contract address.
    pub const fn wallet_contract(mut self, address: Address) -> Self {
        self.contracts.wallet = address;
        self
    }

    /// Override the token contract address.
    pub const fn token_contract(mut self, address: Address) -> Self {
        self.contracts.token = address;
        self
    }

    /// Build the network configuration.
    pub const fn build(self) -> NetworkConfig {
        NetworkConfig {
            network_type: self.network_type,
            chain: self.chain,
            contracts: self.contracts,
        }
    }
}
