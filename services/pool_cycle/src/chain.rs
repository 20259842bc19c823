//! Chain client contract
//!
//! The orchestrators only talk to the chain through [`ChainClient`]: a handful
//! of reads, one submit, one confirmation wait and an off-path typed-data
//! signer. [`crate::rpc_client::EthersChainClient`] is the production
//! implementation; [`crate::testing::MockChainClient`] backs the tests.

use anyhow::Result;
use async_trait::async_trait;
use ethers::types::transaction::eip712::TypedData;
use ethers::types::{Address, Bytes, Signature, H256, U256};

use crate::error::CycleError;
use crate::logging::LogEmoji;

/// A state-changing contract call ready to be turned into a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    /// Short name used in logs and errors ("deposit", "approve", ...)
    pub label: &'static str,
    pub to: Address,
    pub data: Bytes,
    /// Native value attached to the call
    pub value: U256,
}

impl ContractCall {
    pub fn new(label: &'static str, to: Address, data: Bytes) -> Self {
        Self {
            label,
            to,
            data,
            value: U256::zero(),
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

/// Final state of a submitted transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxOutcome {
    Confirmed { block_number: u64 },
    Reverted { block_number: u64 },
    TimedOut { waited_secs: u64 },
}

impl TxOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, TxOutcome::Confirmed { .. })
    }

    /// Confirmed block number, or the matching transaction error
    pub fn into_result(self, label: &'static str, tx_hash: H256) -> Result<u64, CycleError> {
        match self {
            TxOutcome::Confirmed { block_number } => Ok(block_number),
            TxOutcome::Reverted { block_number } => Err(CycleError::TransactionReverted {
                label,
                tx_hash,
                block_number,
            }),
            TxOutcome::TimedOut { waited_secs } => Err(CycleError::TransactionTimedOut {
                label,
                tx_hash,
                waited_secs,
            }),
        }
    }
}

/// Narrow view of the blockchain used by the lifecycle orchestrators
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Account that signs and pays for every transaction
    fn address(&self) -> Address;

    /// Native balance of [`ChainClient::address`] in wei
    async fn native_balance(&self) -> Result<U256>;

    /// Estimated network fee for one lifecycle transaction, in wei
    async fn estimate_fee(&self) -> Result<U256>;

    async fn chain_id(&self) -> Result<U256>;

    async fn block_number(&self) -> Result<u64>;

    /// Read-only call, optionally pinned to a block
    async fn call(&self, to: Address, data: Bytes, block: Option<u64>) -> Result<Bytes>;

    /// Build, sign and broadcast; returns the transaction hash
    async fn submit(&self, call: ContractCall) -> Result<H256>;

    /// Block until the transaction is mined, reverted, or the wait times out
    async fn await_confirmation(&self, tx_hash: H256) -> Result<TxOutcome>;

    /// Sign an EIP-712 payload with the account key
    async fn sign_typed_data(&self, data: &TypedData) -> Result<Signature>;

    /// Block explorer link for a transaction, when known
    fn explorer_tx_url(&self, _tx_hash: H256) -> Option<String> {
        None
    }
}

/// Submit a call and wait for its outcome
///
/// Submission errors propagate; the outcome is returned as-is so the caller
/// can map reverts and timeouts to its own error.
pub async fn submit_and_wait<C: ChainClient + ?Sized>(
    client: &C,
    call: ContractCall,
) -> Result<(H256, TxOutcome)> {
    let label = call.label;
    let tx_hash = client.submit(call).await?;
    match client.explorer_tx_url(tx_hash) {
        Some(url) => {
            tracing::info!("{} {} transaction submitted: {}", LogEmoji::SUBMIT, label, url)
        }
        None => {
            tracing::info!("{} {} transaction submitted: {:?}", LogEmoji::SUBMIT, label, tx_hash)
        }
    }
    let outcome = client.await_confirmation(tx_hash).await?;
    Ok((tx_hash, outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_mapping() {
        let hash = H256::repeat_byte(0xab);
        assert_eq!(
            TxOutcome::Confirmed { block_number: 7 }
                .into_result("deposit", hash)
                .unwrap(),
            7
        );

        let reverted = TxOutcome::Reverted { block_number: 9 }.into_result("deposit", hash);
        assert!(matches!(
            reverted,
            Err(CycleError::TransactionReverted { block_number: 9, .. })
        ));

        let timed_out = TxOutcome::TimedOut { waited_secs: 300 }.into_result("withdraw", hash);
        assert!(matches!(
            timed_out,
            Err(CycleError::TransactionTimedOut { waited_secs: 300, label: "withdraw", .. })
        ));
    }
}
