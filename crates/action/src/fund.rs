use crate::Action;
use alloy_primitives::{utils::format_ether, Address, Bytes, U256};
use alloy_sol_types::SolCall;
use binding::wallet::ISmartWallet;

/// Send native currency to the smart contract wallet via `fund()`.
#[derive(Debug, Clone)]
pub struct Fund {
    /// Smart contract wallet address
    pub wallet: Address,
    /// Amount in wei, attached as msg.value
    pub amount: U256,
}

impl Action for Fund {
    fn target(&self) -> Address {
        self.wallet
    }

    fn calldata(&self) -> Bytes {
        ISmartWallet::fundCall {}.abi_encode().into()
    }

    fn value(&self) -> U256 {
        self.amount
    }

    fn description(&self) -> String {
        format!("Funding with {} ETH", format_ether(self.amount))
    }
}
