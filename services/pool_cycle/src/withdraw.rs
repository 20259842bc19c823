//! # Withdrawal Orchestrator - Single-Sided Native Exit
//!
//! ## Purpose
//!
//! Second leg of the cycle. Burns the caller's entire LP balance in the pool
//! the deposit leg produced and receives the reference asset unwrapped to
//! native currency, bounded by a minimum derived from a fresh reserve snapshot.
//!
//! ## Authorisation
//!
//! The router needs permission to pull the LP tokens. By default the
//! [`ApprovalGate`] raises the on-chain allowance when short; in permit mode a
//! signed EIP-712 permit travels inside the burn call instead.
//!
//! ```text
//! Position? → [Balance Guard] → balanceOf → [Snapshot] → [minNativeOut]
//!     ↓              ↓              ↓            ↓
//! MissingPosition  Insufficient  NothingTo   Degenerate
//!                                Withdraw    Reserves
//!
//! → approve-if-short | permit → burnLiquiditySingle → confirm → WithdrawalReceipt
//! ```

use ethers::types::{H256, U256};
use poolcycle_amm::SlippageTolerance;
use poolcycle_config::constants::WITHDRAW_MODE_NATIVE;
use poolcycle_config::AuthorizationMode;
use std::time::Instant;
use tracing::{debug, info};

use crate::approval::{ApprovalGate, ApprovalOutcome};
use crate::balance_guard::ensure_affordable;
use crate::chain::{submit_and_wait, ChainClient};
use crate::contracts::WithdrawalData;
use crate::error::{CycleError, Result};
use crate::logging::LogEmoji;
use crate::permit;
use crate::position::PositionHandle;

/// How the router was authorised to spend the LP tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    Allowance(ApprovalOutcome),
    Permit { deadline: U256 },
}

impl Authorization {
    /// True when a separate approval transaction was sent
    pub fn approval_submitted(&self) -> bool {
        matches!(self, Authorization::Allowance(outcome) if outcome.submitted())
    }
}

/// Confirmed withdrawal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalReceipt {
    pub tx_hash: H256,
    pub block_number: u64,
    /// LP tokens burned
    pub liquidity: U256,
    pub min_native_out: U256,
    pub authorization: Authorization,
}

pub struct WithdrawalOrchestrator<'a, C: ChainClient + ?Sized> {
    client: &'a C,
    tolerance: SlippageTolerance,
    mode: AuthorizationMode,
}

impl<'a, C: ChainClient + ?Sized> WithdrawalOrchestrator<'a, C> {
    pub fn new(client: &'a C, tolerance: SlippageTolerance, mode: AuthorizationMode) -> Self {
        Self {
            client,
            tolerance,
            mode,
        }
    }

    /// Burn the full LP balance of the position's pool
    ///
    /// `Ok` only once the burn is confirmed; every other path is an error.
    pub async fn withdraw(&self, position: Option<&PositionHandle>) -> Result<WithdrawalReceipt> {
        let position = position.ok_or(CycleError::MissingPosition)?;
        let pool = position.pool();
        let caller = self.client.address();
        let started = Instant::now();

        ensure_affordable(self.client, U256::zero()).await?;

        let liquidity = pool.lp_balance(self.client, caller).await?;
        if liquidity.is_zero() {
            return Err(CycleError::NothingToWithdraw {
                pool: pool.pool,
                owner: caller,
            });
        }
        info!("{} Withdrawing {} LP from pool {:?}", LogEmoji::WITHDRAW, liquidity, pool.pool);

        let snapshot = pool.snapshot(self.client).await?;
        let min_native_out = snapshot
            .min_native_out(liquidity, self.tolerance)
            .map_err(|e| CycleError::from_slippage(pool.pool, e))?;
        debug!(
            "minNativeOut={} (tolerance {}, block {})",
            min_native_out, self.tolerance, snapshot.block_number
        );

        let withdrawal = WithdrawalData {
            token_out: position.reference_token(),
            recipient: caller,
            mode: WITHDRAW_MODE_NATIVE,
        };

        let (call, authorization) = match self.mode {
            AuthorizationMode::Approve => {
                let outcome = ApprovalGate::new(self.client, pool)
                    .ensure_allowance(liquidity)
                    .await?;
                let call = pool.abi.withdraw_call(
                    pool.router,
                    pool.pool,
                    liquidity,
                    withdrawal,
                    min_native_out,
                )?;
                (call, Authorization::Allowance(outcome))
            }
            AuthorizationMode::Permit => {
                let signed = permit::authorize(self.client, pool, liquidity).await?;
                let deadline = signed.deadline;
                let call = pool.abi.withdraw_with_permit_call(
                    pool.router,
                    pool.pool,
                    liquidity,
                    withdrawal,
                    min_native_out,
                    signed.into_params(),
                )?;
                (call, Authorization::Permit { deadline })
            }
        };

        let (tx_hash, outcome) = submit_and_wait(self.client, call).await?;
        let block_number = outcome.into_result("withdraw", tx_hash)?;

        crate::log_success!(
            "Liquidity burned from pool {:?} in block {} ({}ms)",
            pool.pool,
            block_number,
            started.elapsed().as_millis()
        );
        Ok(WithdrawalReceipt {
            tx_hash,
            block_number,
            liquidity,
            min_native_out,
            authorization,
        })
    }
}
