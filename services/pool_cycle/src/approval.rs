//! LP-token allowance gate for the router
//!
//! Reads the current allowance and submits `approve` only when it falls short.
//! Whether an approval was actually sent is reported on the outcome so callers
//! and tests can tell the two paths apart.

use ethers::types::{H256, U256};
use tracing::{info, warn};

use crate::chain::{submit_and_wait, ChainClient, TxOutcome};
use crate::error::{CycleError, Result};
use crate::logging::LogEmoji;
use crate::pool::PoolReference;

/// Result of [`ApprovalGate::ensure_allowance`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalOutcome {
    /// Existing allowance already covered the requirement; nothing submitted
    AlreadySufficient { allowance: U256 },
    /// An approval transaction was submitted and confirmed
    Approved { tx_hash: H256, block_number: u64 },
}

impl ApprovalOutcome {
    pub fn submitted(&self) -> bool {
        matches!(self, ApprovalOutcome::Approved { .. })
    }
}

pub struct ApprovalGate<'a, C: ChainClient + ?Sized> {
    client: &'a C,
    pool: &'a PoolReference,
}

impl<'a, C: ChainClient + ?Sized> ApprovalGate<'a, C> {
    pub fn new(client: &'a C, pool: &'a PoolReference) -> Self {
        Self { client, pool }
    }

    /// Make sure the router may spend at least `required` LP tokens
    ///
    /// Approves exactly `required`. Any failure after the allowance read is
    /// reported as [`CycleError::ApprovalFailed`].
    pub async fn ensure_allowance(&self, required: U256) -> Result<ApprovalOutcome> {
        let owner = self.client.address();
        let spender = self.pool.router;
        let token = self.pool.pool;

        let allowance = self.pool.allowance(self.client, owner, spender).await?;
        if allowance >= required {
            info!("🔓 Router allowance {} already covers {}", allowance, required);
            return Ok(ApprovalOutcome::AlreadySufficient { allowance });
        }

        info!(
            "{} Approving router {:?} for {} LP (current allowance {})",
            LogEmoji::APPROVE,
            spender,
            required,
            allowance
        );
        let failed = |tx_hash: Option<H256>, reason: String| CycleError::ApprovalFailed {
            token,
            spender,
            amount: required,
            tx_hash,
            reason,
        };

        let call = self.pool.abi.approve_call(token, spender, required)?;
        let (tx_hash, outcome) = submit_and_wait(self.client, call)
            .await
            .map_err(|e| failed(None, format!("{e:#}")))?;

        match outcome {
            TxOutcome::Confirmed { block_number } => {
                crate::log_success!("Approval confirmed in block {}", block_number);
                Ok(ApprovalOutcome::Approved {
                    tx_hash,
                    block_number,
                })
            }
            TxOutcome::Reverted { block_number } => {
                warn!(
                    "{} Approval {:?} reverted in block {}",
                    LogEmoji::WARNING,
                    tx_hash,
                    block_number
                );
                Err(failed(Some(tx_hash), format!("reverted in block {block_number}")))
            }
            TxOutcome::TimedOut { waited_secs } => {
                warn!(
                    "{} Approval {:?} not confirmed after {}s",
                    LogEmoji::TIMEOUT,
                    tx_hash,
                    waited_secs
                );
                Err(failed(Some(tx_hash), format!("not confirmed after {waited_secs}s")))
            }
        }
    }
}
