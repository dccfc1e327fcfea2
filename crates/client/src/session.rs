//! Connection context shared by every action of one invocation.

use crate::{ClientError, WalletProvider};
use alloy_primitives::Address;
use alloy_provider::Provider;
use std::sync::Arc;
use tracing::info;

/// A connected wallet: read client, signing handle, authorized account and chain.
///
/// Acquired once through [`Session::connect`] and passed by reference to each
/// action instead of re-creating clients per call.
pub struct Session<P> {
    provider: P,
    wallet: Arc<dyn WalletProvider>,
    account: Address,
    chain_id: u64,
}

impl<P> Session<P>
where
    P: Provider + Clone,
{
    /// Request the user-authorized account and chain ID from the wallet.
    ///
    /// Fails with [`ClientError::NoWalletProvider`] when no wallet is given.
    pub async fn connect(
        provider: P,
        wallet: Option<Arc<dyn WalletProvider>>,
    ) -> Result<Self, ClientError> {
        let wallet = wallet.ok_or(ClientError::NoWalletProvider)?;

        let account = wallet
            .request_addresses()
            .await?
            .into_iter()
            .next()
            .ok_or(ClientError::NoAccounts)?;
        let chain_id = wallet.chain_id().await?;

        info!(%account, chain_id, "Wallet connected");

        Ok(Self {
            provider,
            wallet,
            account,
            chain_id,
        })
    }

    pub const fn provider(&self) -> &P {
        &self.provider
    }

    pub fn wallet(&self) -> &dyn WalletProvider {
        self.wallet.as_ref()
    }

    pub const fn account(&self) -> Address {
        self.account
    }

    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }
}
