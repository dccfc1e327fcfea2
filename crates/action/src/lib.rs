//! Contract actions for the smart contract wallet and the token.
//!
//! Every state-changing action follows the same path: build the call request
//! from the connected [`Session`], dry-run it with `eth_call`, then hand the
//! simulated request to the wallet provider for signing and submission.

pub mod connect;
pub mod error;
pub mod fund;
pub mod input;
pub mod token;
pub mod withdraw;

use alloy_primitives::{Address, Bytes, TxHash, TxKind, U256};
use alloy_provider::Provider;
use alloy_rpc_types::{TransactionInput, TransactionRequest};
use client::Session;
pub use error::ActionError;
use tracing::{debug, info};

/// A contract call initiated from the connected account.
pub trait Action: Send + Sync {
    /// Contract the call is sent to.
    fn target(&self) -> Address;

    /// ABI-encoded calldata.
    fn calldata(&self) -> Bytes;

    /// Native value attached to the call.
    fn value(&self) -> U256 {
        U256::ZERO
    }

    /// Validate the return data of a successful simulation.
    fn check_output(&self, _output: &Bytes) -> Result<(), ActionError> {
        Ok(())
    }

    /// Get a human-readable description of this action.
    fn description(&self) -> String;
}

/// A call that passed simulation and is ready to be signed.
#[derive(Debug, Clone)]
pub struct Simulated {
    /// Request to hand to the wallet provider
    pub request: TransactionRequest,
    /// Raw return data of the dry run
    pub output: Bytes,
}

/// Result of a submitted action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submitted {
    /// Transaction hash
    pub tx_hash: TxHash,
}

/// Build the unsigned call request for `action` sent by `from`.
pub fn build_request<A: Action + ?Sized>(
    action: &A,
    from: Address,
    chain_id: u64,
) -> TransactionRequest {
    let value = action.value();

    TransactionRequest {
        from: Some(from),
        to: Some(TxKind::Call(action.target())),
        input: TransactionInput::new(action.calldata()),
        value: (!value.is_zero()).then_some(value),
        chain_id: Some(chain_id),
        ..Default::default()
    }
}

/// Dry-run the action against the node from the session account.
pub async fn simulate<P, A>(session: &Session<P>, action: &A) -> Result<Simulated, ActionError>
where
    P: Provider + Clone,
    A: Action + ?Sized,
{
    let request = build_request(action, session.account(), session.chain_id());

    let output = session
        .provider()
        .call(request.clone())
        .await
        .map_err(|e| ActionError::Simulation(e.to_string()))?;

    action.check_output(&output)?;
    debug!(target = %action.target(), output = ?output, "Simulation succeeded");

    Ok(Simulated { request, output })
}

/// Sign and broadcast a simulated request through the session wallet.
pub async fn submit<P>(session: &Session<P>, simulated: Simulated) -> Result<Submitted, ActionError>
where
    P: Provider + Clone,
{
    let tx_hash = session.wallet().send_transaction(simulated.request).await?;
    Ok(Submitted { tx_hash })
}

/// Simulate then submit.
pub async fn execute<P, A>(session: &Session<P>, action: &A) -> Result<Submitted, ActionError>
where
    P: Provider + Clone,
    A: Action + ?Sized,
{
    let description = action.description();
    info!(account = %session.account(), "{description}...");

    let simulated = simulate(session, action).await?;
    let submitted = submit(session, simulated).await?;

    info!(tx_hash = %submitted.tx_hash, "{description}: transaction submitted");
    Ok(submitted)
}
