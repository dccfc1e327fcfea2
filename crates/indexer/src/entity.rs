//! Indexed record types.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Seconds in one day bucket.
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Identifier of the singleton [`Token`] record.
pub const TOKEN_ID: &str = "1";

/// Day bucket of a block timestamp (plain integer division).
pub const fn day_bucket(timestamp: u64) -> u64 {
    timestamp / SECONDS_PER_DAY
}

/// Running token balance of one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holder {
    pub id: Address,
    pub balance: U256,
}

impl Holder {
    pub const fn new(id: Address) -> Self {
        Self {
            id,
            balance: U256::ZERO,
        }
    }
}

/// Token-wide aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    /// Holders whose balance is strictly positive
    pub holder_count: u64,
}

impl Default for Token {
    fn default() -> Self {
        Self {
            id: TOKEN_ID.to_string(),
            holder_count: 0,
        }
    }
}

/// Aggregates of one day bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStat {
    /// Day bucket, see [`day_bucket`]
    pub id: u64,
    /// First second of the bucket
    pub start_timestamp: u64,
    /// Sum of transferred values, mints and burns included
    pub volume: U256,
    /// Token holder count after the latest event of the day
    pub holder_count: u64,
    /// Sum of `MintingHappened` amounts
    #[serde(default)]
    pub minted: U256,
    /// Sum of `BurningHappened` amounts
    #[serde(default)]
    pub burned: U256,
    /// Non-zero addresses that sent tokens this day
    #[serde(default)]
    pub senders: BTreeSet<Address>,
    /// Non-zero addresses on either side of a transfer this day
    #[serde(default)]
    pub wallets: BTreeSet<Address>,
    /// Wallet contract `readSupply()` seen when the day was last indexed
    #[serde(default)]
    pub wallet_supply: Option<U256>,
}

impl DailyStat {
    pub const fn new(day: u64) -> Self {
        Self {
            id: day,
            start_timestamp: day * SECONDS_PER_DAY,
            volume: U256::ZERO,
            holder_count: 0,
            minted: U256::ZERO,
            burned: U256::ZERO,
            senders: BTreeSet::new(),
            wallets: BTreeSet::new(),
            wallet_supply: None,
        }
    }

    pub fn unique_senders(&self) -> u64 {
        self.senders.len() as u64
    }

    pub fn active_wallets(&self) -> u64 {
        self.wallets.len() as u64
    }
}
