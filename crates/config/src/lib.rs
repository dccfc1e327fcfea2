//! Configuration types for the tcript workspace.
//!
//! This crate provides:
//! - Network presets (zkSync Era mainnet and Sepolia testnet)
//! - Contract addresses for the wallet and token contracts
//! - Configuration building and validation

pub mod network;

pub use network::{
    ChainConfig, ConfigError, ContractsConfig, NetworkConfig, NetworkConfigBuilder, NetworkType,
};
