use crate::Action;
use alloy_primitives::{Address, Bytes};
use alloy_sol_types::SolCall;
use binding::wallet::ISmartWallet;

/// Release the wallet's native balance to its owner via `withdraw()`.
#[derive(Debug, Clone)]
pub struct Withdraw {
    /// Smart contract wallet address
    pub wallet: Address,
}

impl Action for Withdraw {
    fn target(&self) -> Address {
        self.wallet
    }

    fn calldata(&self) -> Bytes {
        ISmartWallet::withdrawCall {}.abi_encode().into()
    }

    fn description(&self) -> String {
        format!("Withdrawing from wallet {}", self.wallet)
    }
}
