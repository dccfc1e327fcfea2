//! Smart contract wallet bindings.
//!
//! The wallet holds native currency sent through `fund` and releases it to
//! its owner through `withdraw`. It also reports the supply it manages.

use alloy_sol_types::sol;

sol! {
    /// Smart contract wallet
    #[sol(rpc)]
    interface ISmartWallet {
        /// Send native currency to the wallet (msg.value is the amount)
        function fund() external payable;

        /// Withdraw the wallet's native balance to the owner
        function withdraw() external;

        /// Supply currently managed by the wallet
        function readSupply() external view returns (uint256);
    }
}
