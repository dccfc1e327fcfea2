//! Wallet connection and the status label it produces.

use crate::ActionError;
use alloy_provider::Provider;
use client::{ClientError, Session, WalletProvider};
use std::sync::Arc;
use tracing::warn;

/// Status label shown after a successful connection.
pub const CONNECTED: &str = "Connected!";

/// Status label shown when no wallet provider is available.
pub const MISSING_WALLET: &str = "Please install a wallet provider!";

/// Outcome of a connection attempt.
///
/// A missing wallet is not an error: it is reported by relabeling the status.
pub enum Connection<P> {
    Connected(Session<P>),
    MissingWallet,
}

impl<P> Connection<P> {
    pub const fn status(&self) -> &'static str {
        match self {
            Self::Connected(_) => CONNECTED,
            Self::MissingWallet => MISSING_WALLET,
        }
    }

    pub fn into_session(self) -> Option<Session<P>> {
        match self {
            Self::Connected(session) => Some(session),
            Self::MissingWallet => None,
        }
    }
}

/// Request the authorized account from the wallet, if one is configured.
pub async fn connect<P>(
    provider: P,
    wallet: Option<Arc<dyn WalletProvider>>,
) -> Result<Connection<P>, ActionError>
where
    P: Provider + Clone,
{
    match Session::connect(provider, wallet).await {
        Ok(session) => Ok(Connection::Connected(session)),
        Err(ClientError::NoWalletProvider) => {
            warn!("No wallet provider configured");
            Ok(Connection::MissingWallet)
        }
        Err(e) => Err(e.into()),
    }
}
