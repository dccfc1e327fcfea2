use client::ClientError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ActionError {
    /// A form amount could not be parsed
    #[error("Invalid amount {input:?}: {reason}")]
    InvalidAmount { input: String, reason: String },

    /// The dry run reverted or the node refused it
    #[error("Simulation failed: {0}")]
    Simulation(String),

    /// Return data did not match the function signature
    #[error("Unexpected call output: {0}")]
    UnexpectedOutput(String),

    /// The token call simulated successfully but returned `false`
    #[error("Contract call returned false")]
    ReturnedFalse,

    #[error(transparent)]
    Client(#[from] ClientError),
}
