use crate::{Allowance, Balance, BalanceQuery, Monitor, SupplyQuery};
use alloy_primitives::{Address, U256};
use alloy_provider::Provider;
use binding::{token::IERC20, wallet::ISmartWallet};
use eyre::Result;
use tracing::debug;

// Balance monitor implementation.
pub struct BalanceMonitor<P> {
    provider: P,
}

impl<P> BalanceMonitor<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }

    async fn query_native(&self, address: Address) -> Result<Balance> {
        debug!("Querying native balance: address={}", address);

        let balance = self.provider.get_balance(address).await?;

        Ok(Balance {
            holder: address,
            asset: Address::ZERO,
            amount: balance,
        })
    }

    async fn query_erc20(&self, token: Address, holder: Address) -> Result<Balance> {
        debug!("Querying erc20 {} balance: address={}", token, holder);

        let contract = IERC20::new(token, &self.provider);
        let amount = contract.balanceOf(holder).call().await?;

        Ok(Balance {
            holder,
            asset: token,
            amount,
        })
    }
}

impl<P> Monitor for BalanceMonitor<P>
where
    P: Provider + Clone,
{
    async fn query_balance(&self, query: BalanceQuery) -> Result<Balance> {
        match query {
            BalanceQuery::ERC20Balance { token, holder } => self.query_erc20(token, holder).await,
            BalanceQuery::NativeBalance { address } => self.query_native(address).await,
        }
    }

    async fn query_allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<Allowance> {
        debug!(%token, %owner, %spender, "Querying allowance");

        let contract = IERC20::new(token, &self.provider);
        let amount = contract.allowance(owner, spender).call().await?;

        Ok(Allowance {
            token,
            owner,
            spender,
            amount,
        })
    }

    async fn query_supply(&self, query: SupplyQuery) -> Result<U256> {
        debug!(?query, "Querying supply");

        let supply = match query {
            SupplyQuery::TokenTotalSupply { token } => {
                IERC20::new(token, &self.provider)
                    .totalSupply()
                    .call()
                    .await?
            }
            SupplyQuery::WalletSupply { wallet } => {
                ISmartWallet::new(wallet, &self.provider)
                    .readSupply()
                    .call()
                    .await?
            }
        };

        Ok(supply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_serialization() {
        let query = BalanceQuery::NativeBalance {
            address: Address::repeat_byte(1),
        };

        let json = serde_json::to_string(&query).unwrap();
        let parsed: BalanceQuery = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, query);
        assert!(json.contains("NativeBalance"));
    }
}
