//! ERC20 token contract bindings.

use alloy_sol_types::sol;

sol! {
    /// ERC20 token interface with the token's supply notifications
    #[sol(rpc)]
    interface IERC20 {
        /// Emitted when tokens are transferred
        event Transfer(
            address indexed from,
            address indexed to,
            uint256 value
        );

        /// Emitted by the token after new supply is minted
        event MintingHappened(uint256 amount);

        /// Emitted by the token after supply is burned
        event BurningHappened(uint256 amount);

        /// Get token balance of an account
        function balanceOf(address account) external view returns (uint256);

        /// Get allowance granted by owner to spender
        function allowance(address owner, address spender) external view returns (uint256);

        /// Approve spender to spend tokens
        function approve(address spender, uint256 amount) external returns (bool);

        /// Transfer tokens to recipient
        function transfer(address recipient, uint256 amount) external returns (bool);

        /// Transfer tokens from sender to recipient (requires allowance)
        function transferFrom(address sender, address recipient, uint256 amount) external returns (bool);

        /// Get total supply
        function totalSupply() external view returns (uint256);
    }
}
