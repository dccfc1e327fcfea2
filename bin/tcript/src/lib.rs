pub mod config;
pub mod metrics;

use crate::metrics::Metrics;
use alloy_primitives::{Address, U256};
use alloy_provider::Provider;
use balance::{monitor::BalanceMonitor, Balance, BalanceQuery, Monitor};
use client::{LocalWallet, RemoteSigner, RemoteWallet, WalletProvider};
use indexer::{day_bucket, token_units, DailyStat, IndexState};
use serde::Serialize;
use std::{
    fmt,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

/// Where signatures come from.
#[derive(Clone, PartialEq, Eq)]
pub enum WalletSource {
    /// Private key held in process
    PrivateKey(String),
    /// Signer proxy holding the key for `address`
    Remote { url: String, address: Address },
}

impl fmt::Debug for WalletSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrivateKey(_) => f.write_str("PrivateKey(<redacted>)"),
            Self::Remote { url, address } => f
                .debug_struct("Remote")
                .field("url", url)
                .field("address", address)
                .finish(),
        }
    }
}

impl WalletSource {
    /// Pick a source from CLI/env options. `None` means no wallet provider.
    pub fn from_options(
        private_key: Option<String>,
        signer_url: Option<String>,
        signer_address: Option<Address>,
    ) -> eyre::Result<Option<Self>> {
        match (private_key, signer_url) {
            (Some(_), Some(_)) => {
                eyre::bail!("Configure either a private key or a signer url, not both")
            }
            (Some(key), None) => Ok(Some(Self::PrivateKey(key))),
            (None, Some(url)) => {
                let address = signer_address
                    .ok_or_else(|| eyre::eyre!("A signer url requires a signer address"))?;
                Ok(Some(Self::Remote { url, address }))
            }
            (None, None) => Ok(None),
        }
    }

    /// Build the wallet provider backed by this source.
    pub fn into_wallet<P>(self, provider: P, chain_id: u64) -> eyre::Result<Arc<dyn WalletProvider>>
    where
        P: Provider + Clone + 'static,
    {
        let wallet: Arc<dyn WalletProvider> = match self {
            Self::PrivateKey(key) => Arc::new(LocalWallet::new(&key, provider)?),
            Self::Remote { url, address } => Arc::new(RemoteWallet::new(
                RemoteSigner::new(url, address, chain_id),
                provider,
            )),
        };

        Ok(wallet)
    }
}

pub async fn check_native_balance<P>(
    monitor: &BalanceMonitor<P>,
    address: Address,
) -> eyre::Result<Balance>
where
    P: Provider + Clone,
{
    let query = BalanceQuery::NativeBalance { address };
    let balance = monitor.query_balance(query).await?;
    Ok(balance)
}

pub async fn check_token_balance<P>(
    monitor: &BalanceMonitor<P>,
    token: Address,
    holder: Address,
) -> eyre::Result<Balance>
where
    P: Provider + Clone,
{
    let query = BalanceQuery::ERC20Balance { token, holder };
    let balance = monitor.query_balance(query).await?;
    Ok(balance)
}

/// Snapshot of the indexed records, printed by `tcript-indexer stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexSummary {
    pub last_block: Option<u64>,
    pub holder_count: u64,
    /// Addresses with a record, including emptied ones
    pub tracked_addresses: usize,
    pub days: usize,
    pub latest_day: Option<DailyStat>,
}

pub fn summarize(state: &IndexState) -> IndexSummary {
    use indexer::Store;

    IndexSummary {
        last_block: state.last_block,
        holder_count: state
            .store
            .token()
            .map(|token| token.holder_count)
            .unwrap_or_default(),
        tracked_addresses: state.store.holders().count(),
        days: state.store.daily_stats().count(),
        latest_day: state.store.latest_daily_stat().cloned(),
    }
}

/// Day bucket of the wall clock.
pub fn current_day() -> eyre::Result<u64> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?;
    Ok(day_bucket(now.as_secs()))
}

/// Supply the demand index is measured against: `supply` when given,
/// otherwise the most recent wallet supply snapshot in the index.
pub fn circulating_supply(state: &IndexState, supply: Option<U256>) -> eyre::Result<U256> {
    supply
        .or_else(|| {
            state
                .store
                .daily_stats()
                .rev()
                .find_map(|stat| stat.wallet_supply)
        })
        .ok_or_else(|| eyre::eyre!("No wallet supply snapshot indexed, pass --supply"))
}

/// Push the indexed state into the gauges.
pub fn publish_index_metrics(metrics: &Metrics, summary: &IndexSummary) {
    metrics.set_holder_count(summary.holder_count);

    if let Some(block) = summary.last_block {
        metrics.set_last_block(block);
    }
    if let Some(day) = &summary.latest_day {
        metrics.set_latest_daily_volume(token_units(day.volume));
        if let Some(supply) = day.wallet_supply {
            metrics.set_latest_wallet_supply(token_units(supply));
        }
    }
}
