//! # Deposit Orchestrator - Native Liquidity Entry
//!
//! ## Purpose
//!
//! First leg of the cycle. Resolves the pool for the configured pair, checks the
//! account can pay for value plus gas, derives the LP floor from a fresh reserve
//! snapshot and drives the router deposit through confirmation. A confirmed
//! deposit yields the [`PositionHandle`] the withdrawal leg consumes.
//!
//! ## Failure Semantics
//!
//! Each step either succeeds or aborts the leg with a [`CycleError`]; nothing is
//! retained between steps. No handle exists unless the deposit confirmed.
//!
//! ```text
//! getPool → [Balance Guard] → [Reserve Snapshot] → [minLpOut] → addLiquidity2 → confirm
//!    ↓             ↓                  ↓                                             ↓
//! PoolNotFound  InsufficientFunds  DegenerateReserves              Reverted / TimedOut
//! ```

use ethers::types::U256;
use ethers::utils::format_ether;
use poolcycle_amm::SlippageTolerance;
use std::time::Instant;
use tracing::{debug, info};

use crate::balance_guard::ensure_affordable;
use crate::chain::{submit_and_wait, ChainClient};
use crate::error::{CycleError, Result};
use crate::logging::LogEmoji;
use crate::pool::PoolContracts;
use crate::position::PositionHandle;

pub struct DepositOrchestrator<'a, C: ChainClient + ?Sized> {
    client: &'a C,
    contracts: &'a PoolContracts,
    tolerance: SlippageTolerance,
}

impl<'a, C: ChainClient + ?Sized> DepositOrchestrator<'a, C> {
    pub fn new(client: &'a C, contracts: &'a PoolContracts, tolerance: SlippageTolerance) -> Self {
        Self {
            client,
            contracts,
            tolerance,
        }
    }

    /// Deposit `amount` wei of native currency and return the position
    pub async fn deposit(&self, amount: U256) -> Result<PositionHandle> {
        let started = Instant::now();
        info!("{} Depositing {} native into pool", LogEmoji::DEPOSIT, format_ether(amount));

        let pool = self.contracts.resolve(self.client).await?;
        info!("{} Pool resolved: {:?}", LogEmoji::POOL, pool.pool);

        ensure_affordable(self.client, amount).await?;

        let snapshot = pool.snapshot(self.client).await?;
        let min_lp_out = snapshot
            .min_lp_out(amount, self.tolerance)
            .map_err(|e| CycleError::from_slippage(pool.pool, e))?;
        debug!(
            "minLpOut={} (tolerance {}, block {})",
            min_lp_out, self.tolerance, snapshot.block_number
        );

        let call = pool.abi.deposit_call(
            pool.router,
            pool.pool,
            amount,
            self.client.address(),
            min_lp_out,
        )?;

        let (tx_hash, outcome) = submit_and_wait(self.client, call).await?;
        let block_number = outcome.into_result("deposit", tx_hash)?;

        crate::log_success!(
            "Liquidity added to pool {:?} in block {} ({}ms)",
            pool.pool,
            block_number,
            started.elapsed().as_millis()
        );
        Ok(PositionHandle::new(pool, tx_hash, amount, min_lp_out))
    }
}
