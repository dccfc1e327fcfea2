//! ERC20 token actions: approve, transfer and transferFrom.

use crate::{Action, ActionError};
use alloy_primitives::{utils::format_ether, Address, Bytes, U256};
use alloy_sol_types::{sol_data, SolCall, SolType};
use binding::token::IERC20;

/// Grant `spender` an allowance of `amount`.
#[derive(Debug, Clone)]
pub struct Approve {
    pub token: Address,
    pub spender: Address,
    pub amount: U256,
}

/// Move `amount` from the connected account to `recipient`.
#[derive(Debug, Clone)]
pub struct Transfer {
    pub token: Address,
    pub recipient: Address,
    pub amount: U256,
}

/// Move `amount` from `sender` to `recipient` using the connected account's allowance.
#[derive(Debug, Clone)]
pub struct TransferFrom {
    pub token: Address,
    pub sender: Address,
    pub recipient: Address,
    pub amount: U256,
}

impl Action for Approve {
    fn target(&self) -> Address {
        self.token
    }

    fn calldata(&self) -> Bytes {
        IERC20::approveCall {
            spender: self.spender,
            amount: self.amount,
        }
        .abi_encode()
        .into()
    }

    fn check_output(&self, output: &Bytes) -> Result<(), ActionError> {
        check_success(output)
    }

    fn description(&self) -> String {
        format!(
            "Approving {} tokens for spender {}",
            format_ether(self.amount),
            self.spender
        )
    }
}

impl Action for Transfer {
    fn target(&self) -> Address {
        self.token
    }

    fn calldata(&self) -> Bytes {
        IERC20::transferCall {
            recipient: self.recipient,
            amount: self.amount,
        }
        .abi_encode()
        .into()
    }

    fn check_output(&self, output: &Bytes) -> Result<(), ActionError> {
        check_success(output)
    }

    fn description(&self) -> String {
        format!(
            "Transferring {} tokens to {}",
            format_ether(self.amount),
            self.recipient
        )
    }
}

impl Action for TransferFrom {
    fn target(&self) -> Address {
        self.token
    }

    fn calldata(&self) -> Bytes {
        IERC20::transferFromCall {
            sender: self.sender,
            recipient: self.recipient,
            amount: self.amount,
        }
        .abi_encode()
        .into()
    }

    fn check_output(&self, output: &Bytes) -> Result<(), ActionError> {
        check_success(output)
    }

    fn description(&self) -> String {
        format!(
            "Transferring {} tokens from {} to {}",
            format_ether(self.amount),
            self.sender,
            self.recipient
        )
    }
}

/// Decode the `bool` returned by ERC20 mutators.
///
/// Tokens that return nothing are treated as successful.
fn check_success(output: &Bytes) -> Result<(), ActionError> {
    if output.is_empty() {
        return Ok(());
    }

    let success = sol_data::Bool::abi_decode(output)
        .map_err(|e| ActionError::UnexpectedOutput(e.to_string()))?;

    if !success {
        return Err(ActionError::ReturnedFalse);
    }

    Ok(())
}
