//! Balance and allowance reads for the wallet and token contracts.
//!
//! This crate provides high-level interfaces for the read-only side of the
//! workspace: native balance of the smart contract wallet, token balances,
//! allowances and supply figures.

pub mod monitor;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Represents a blockchain balance at a specific point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// The address holding the balance
    pub holder: Address,
    /// The asset address (zero address for native token)
    pub asset: Address,
    /// The balance amount
    pub amount: U256,
}

/// Allowance granted by an owner to a spender on a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allowance {
    pub token: Address,
    pub owner: Address,
    pub spender: Address,
    pub amount: U256,
}

/// Type of balance query to perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalanceQuery {
    /// Query ERC20 token balance for an EOA or contract
    ERC20Balance {
        /// Token contract address
        token: Address,
        /// Holder address
        holder: Address,
    },
    /// Query native balance (e.g. of the smart contract wallet)
    NativeBalance {
        /// Account address
        address: Address,
    },
}

/// Source of a supply figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupplyQuery {
    /// `totalSupply()` of the token
    TokenTotalSupply { token: Address },
    /// `readSupply()` of the smart contract wallet
    WalletSupply { wallet: Address },
}

/// Trait for monitoring balances on a blockchain.
pub trait Monitor: Send + Sync {
    /// Query a single balance.
    fn query_balance(
        &self,
        query: BalanceQuery,
    ) -> impl Future<Output = eyre::Result<Balance>> + Send;

    /// Query the allowance `owner` granted `spender` on `token`.
    fn query_allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> impl Future<Output = eyre::Result<Allowance>> + Send;

    /// Query a supply figure.
    fn query_supply(&self, query: SupplyQuery) -> impl Future<Output = eyre::Result<U256>> + Send;
}
