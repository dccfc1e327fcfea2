//! Remote transaction signer that delegates signing to a signer-proxy service.
//!
//! The proxy plays the role of an injected wallet: it owns the key (typically
//! in an HSM or secure enclave) and answers `eth_signTransaction` JSON-RPC
//! requests with raw signed transactions.

use crate::ClientError;
use alloy_primitives::{Address, Bytes};
use alloy_rpc_types::eth::TransactionRequest;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// A remote signer backed by a signer-proxy service.
///
/// # Example
///
/// ```ignore
/// let signer = RemoteSigner::new("http://localhost:9060", address, 300);
/// let raw = signer.sign_transaction(tx_request).await?;
/// provider.send_raw_transaction(&raw).await?;
/// ```
#[derive(Debug, Clone)]
pub struct RemoteSigner {
    client: reqwest::Client,
    proxy_url: String,
    address: Address,
    chain_id: u64,
}

impl RemoteSigner {
    /// Creates a new remote signer.
    ///
    /// # Arguments
    /// * `proxy_url` - The URL of the signer-proxy service (e.g., "http://localhost:9060")
    /// * `address` - The account the proxy signs for
    /// * `chain_id` - The chain ID for EIP-155 replay protection
    pub fn new(proxy_url: impl Into<String>, address: Address, chain_id: u64) -> Self {
        Self::with_client(reqwest::Client::new(), proxy_url, address, chain_id)
    }

    /// Creates a new remote signer with a custom HTTP client.
    pub fn with_client(
        client: reqwest::Client,
        proxy_url: impl Into<String>,
        address: Address,
        chain_id: u64,
    ) -> Self {
        Self {
            client,
            proxy_url: proxy_url.into(),
            address,
            chain_id,
        }
    }

    /// Returns the signer's address.
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Returns the chain ID.
    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Signs a transaction via the remote signer-proxy.
    ///
    /// Returns the signed transaction as raw bytes, ready to be broadcast
    /// via `provider.send_raw_transaction()`.
    pub async fn sign_transaction(&self, tx: TransactionRequest) -> Result<Bytes, ClientError> {
        let signed: SignedTransactionResponse = self.call("eth_signTransaction", [tx]).await?;
        signed
            .raw
            .parse()
            .map_err(|e| ClientError::Signing(format!("invalid raw transaction: {e}")))
    }

    async fn call<T, R>(&self, method: &'static str, params: T) -> Result<R, ClientError>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: 1,
        };

        let response = self
            .client
            .post(&self.proxy_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::Signing(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            return Err(ClientError::Signing(format!(
                "signer-proxy returned {status}: {body}"
            )));
        }

        let rpc_response: JsonRpcResponse<R> = response
            .json()
            .await
            .map_err(|e| ClientError::Signing(e.to_string()))?;

        match rpc_response.result {
            Some(result) => Ok(result),
            None => {
                let error = rpc_response.error.unwrap_or(JsonRpcError {
                    code: -1,
                    message: "unknown error".to_string(),
                });
                Err(ClientError::Signing(format!(
                    "{method} failed with JSON-RPC error {}: {}",
                    error.code, error.message
                )))
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<T> {
    jsonrpc: &'static str,
    method: &'static str,
    params: T,
    id: u32,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

/// Response from eth_signTransaction containing the signed transaction.
#[derive(Debug, Deserialize)]
struct SignedTransactionResponse {
    /// The signed transaction as hex-encoded RLP.
    raw: String,
}
