//! Wallet providers: the account-access and signing capability actions use.

use crate::{fill_transaction, ClientError, RemoteSigner};
use alloy_consensus::TxEnvelope;
use alloy_network::{eip2718::Encodable2718, EthereumWallet, TransactionBuilder};
use alloy_primitives::{Address, Bytes, TxHash};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use tracing::debug;

/// Account access and transaction signing.
///
/// Plays the part of a browser-injected wallet: it hands out the accounts
/// the user authorized and signs + broadcasts prepared requests.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Accounts the wallet is willing to act for. The first one is used.
    async fn request_addresses(&self) -> Result<Vec<Address>, ClientError>;

    /// Chain the wallet signs for.
    async fn chain_id(&self) -> Result<u64, ClientError>;

    /// Fill, sign and broadcast a transaction request.
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, ClientError>;
}

/// Wallet holding a private key in process.
pub struct LocalWallet<P> {
    address: Address,
    wallet: EthereumWallet,
    provider: P,
}

impl<P> LocalWallet<P>
where
    P: Provider + Clone,
{
    pub fn new(private_key: &str, provider: P) -> Result<Self, ClientError> {
        let signer: PrivateKeySigner = private_key
            .parse()
            .map_err(|e| ClientError::InvalidPrivateKey(format!("{}", e)))?;

        Ok(Self {
            address: signer.address(),
            wallet: EthereumWallet::from(signer),
            provider,
        })
    }

    pub const fn address(&self) -> Address {
        self.address
    }
}

#[async_trait]
impl<P> WalletProvider for LocalWallet<P>
where
    P: Provider + Clone + 'static,
{
    async fn request_addresses(&self) -> Result<Vec<Address>, ClientError> {
        Ok(vec![self.address])
    }

    async fn chain_id(&self) -> Result<u64, ClientError> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| ClientError::Rpc(e.to_string()))
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, ClientError> {
        let chain_id = self.chain_id().await?;
        let filled = fill_transaction(tx, &self.provider, self.address, chain_id)
            .await
            .map_err(|e| ClientError::Signing(e.to_string()))?;

        let envelope: TxEnvelope = filled
            .build(&self.wallet)
            .await
            .map_err(|e| ClientError::Signing(e.to_string()))?;

        let mut encoded = Vec::new();
        envelope.encode_2718(&mut encoded);

        broadcast(&self.provider, Bytes::from(encoded)).await
    }
}

/// Wallet whose key lives behind a signer-proxy.
pub struct RemoteWallet<P> {
    signer: RemoteSigner,
    provider: P,
}

impl<P> RemoteWallet<P>
where
    P: Provider + Clone,
{
    pub const fn new(signer: RemoteSigner, provider: P) -> Self {
        Self { signer, provider }
    }
}

#[async_trait]
impl<P> WalletProvider for RemoteWallet<P>
where
    P: Provider + Clone + 'static,
{
    async fn request_addresses(&self) -> Result<Vec<Address>, ClientError> {
        Ok(vec![self.signer.address()])
    }

    async fn chain_id(&self) -> Result<u64, ClientError> {
        Ok(self.signer.chain_id())
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, ClientError> {
        let filled = fill_transaction(
            tx,
            &self.provider,
            self.signer.address(),
            self.signer.chain_id(),
        )
        .await
        .map_err(|e| ClientError::Signing(e.to_string()))?;

        let raw = self.signer.sign_transaction(filled).await?;
        broadcast(&self.provider, raw).await
    }
}

async fn broadcast<P: Provider>(provider: &P, raw: Bytes) -> Result<TxHash, ClientError> {
    let pending = provider
        .send_raw_transaction(&raw)
        .await
        .map_err(|e| ClientError::Submission(e.to_string()))?;

    let tx_hash = *pending.tx_hash();
    debug!(%tx_hash, "Transaction broadcast");
    Ok(tx_hash)
}
