//! Pool resolution and on-chain pool reads
//!
//! [`PoolContracts`] is what the run starts with: factory, router, token pair
//! and descriptors. Resolving it against the factory yields the immutable
//! [`PoolReference`] that both legs of the cycle read from.

use ethers::abi::{Detokenize, Tokenize};
use ethers::types::{Address, U256};
use poolcycle_amm::ReserveSnapshot;
use std::sync::Arc;
use tracing::debug;

use crate::chain::ChainClient;
use crate::contracts::ContractDescriptors;
use crate::error::{CycleError, Result};

/// Protocol contracts and the token pair to look up
#[derive(Debug, Clone)]
pub struct PoolContracts {
    pub factory: Address,
    pub router: Address,
    /// Reference token; the withdrawal pays out through this asset
    pub token_a: Address,
    pub token_b: Address,
    pub abi: Arc<ContractDescriptors>,
}

/// A resolved pool: addresses plus the descriptors needed to call them
#[derive(Debug, Clone)]
pub struct PoolReference {
    pub pool: Address,
    pub factory: Address,
    pub router: Address,
    pub token_a: Address,
    pub token_b: Address,
    pub abi: Arc<ContractDescriptors>,
}

impl PoolContracts {
    /// Ask the factory for the pair's pool; zero means no pool
    pub async fn resolve<C: ChainClient + ?Sized>(&self, client: &C) -> Result<PoolReference> {
        let data = self.abi.factory.encode("getPool", (self.token_a, self.token_b))?;
        let raw = client.call(self.factory, data, None).await?;
        let pool: Address = self.abi.factory.decode_output("getPool", raw)?;

        if pool.is_zero() {
            return Err(CycleError::PoolNotFound {
                factory: self.factory,
                token_a: self.token_a,
                token_b: self.token_b,
            });
        }

        debug!("Resolved pool {:?} for pair {:?}-{:?}", pool, self.token_a, self.token_b);
        Ok(PoolReference {
            pool,
            factory: self.factory,
            router: self.router,
            token_a: self.token_a,
            token_b: self.token_b,
            abi: self.abi.clone(),
        })
    }
}

impl PoolReference {
    async fn read<C, A, T>(
        &self,
        client: &C,
        method: &str,
        args: A,
        block: Option<u64>,
    ) -> Result<T>
    where
        C: ChainClient + ?Sized,
        A: Tokenize,
        T: Detokenize,
    {
        let data = self.abi.pool.encode(method, args)?;
        let raw = client.call(self.pool, data, block).await?;
        Ok(self.abi.pool.decode_output(method, raw)?)
    }

    /// Total supply and native reserve, both read at the same block
    pub async fn snapshot<C: ChainClient + ?Sized>(&self, client: &C) -> Result<ReserveSnapshot> {
        let block = client.block_number().await?;
        let total_supply: U256 = self.read(client, "totalSupply", (), Some(block)).await?;
        let (_reserve0, reserve_native): (U256, U256) =
            self.read(client, "getReserves", (), Some(block)).await?;

        debug!(
            "Reserve snapshot at block {}: total_supply={}, reserve_native={}",
            block, total_supply, reserve_native
        );
        Ok(ReserveSnapshot::new(total_supply, reserve_native, block))
    }

    pub async fn lp_balance<C: ChainClient + ?Sized>(
        &self,
        client: &C,
        owner: Address,
    ) -> Result<U256> {
        self.read(client, "balanceOf", owner, None).await
    }

    pub async fn allowance<C: ChainClient + ?Sized>(
        &self,
        client: &C,
        owner: Address,
        spender: Address,
    ) -> Result<U256> {
        self.read(client, "allowance", (owner, spender), None).await
    }

    /// Permit nonce of `owner` on the LP token
    pub async fn permit_nonce<C: ChainClient + ?Sized>(
        &self,
        client: &C,
        owner: Address,
    ) -> Result<U256> {
        self.read(client, "nonces", owner, None).await
    }

    /// LP token name, used as the EIP-712 domain name
    pub async fn token_name<C: ChainClient + ?Sized>(&self, client: &C) -> Result<String> {
        self.read(client, "name", (), None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockChainClient;

    #[tokio::test]
    async fn test_resolve_known_pool() {
        let mock = MockChainClient::new();
        let contracts = mock.pool_contracts();
        let pool = contracts.resolve(&mock).await.unwrap();
        assert_eq!(pool.pool, mock.pool_address());
        assert_eq!(pool.router, contracts.router);
    }

    #[tokio::test]
    async fn test_resolve_missing_pool() {
        let mock = MockChainClient::new();
        mock.set_pool_address(Address::zero());
        let err = mock.pool_contracts().resolve(&mock).await.unwrap_err();
        assert!(matches!(err, CycleError::PoolNotFound { .. }));
    }

    #[tokio::test]
    async fn test_snapshot_reads_pinned_block() {
        let mock = MockChainClient::new();
        mock.set_reserves(U256::from(5_000_000u64), U256::from(10_000_000u64));
        mock.set_block_number(1234);

        let pool = mock.pool_contracts().resolve(&mock).await.unwrap();
        let snap = pool.snapshot(&mock).await.unwrap();
        assert_eq!(snap.total_supply, U256::from(5_000_000u64));
        assert_eq!(snap.reserve_native, U256::from(10_000_000u64));
        assert_eq!(snap.block_number, 1234);
        assert_eq!(mock.pinned_reads(), vec![1234, 1234]);
    }
}
