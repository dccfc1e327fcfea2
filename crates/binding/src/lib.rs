//! Contract bindings for all external contracts.
//!
//! This crate consolidates the Solidity interfaces the workspace talks to:
//! - the smart contract wallet (fund, withdraw, supply reads)
//! - the ERC20 token, including its mint/burn notification events
//!
//! All bindings are generated using alloy's `sol!` macro.

pub mod token;
pub mod wallet;
