//! Error types for the pool cycle

use ethers::abi::{AbiError, ParseError};
use ethers::types::{Address, H256, U256};
use ethers::utils::format_ether;
use poolcycle_amm::SlippageError;
use thiserror::Error;

/// Result type alias for pool cycle operations
pub type Result<T> = std::result::Result<T, CycleError>;

/// Every way a deposit or withdrawal leg can fail
///
/// All variants are terminal for the current operation. Nothing is retried
/// internally; retry policy belongs to the caller.
#[derive(Debug, Error)]
pub enum CycleError {
    /// Factory returned the zero address for the pair
    #[error("Pool not found for pair {token_a:?}-{token_b:?} (factory {factory:?})")]
    PoolNotFound {
        factory: Address,
        token_a: Address,
        token_b: Address,
    },

    /// Native balance cannot cover value plus network fee
    #[error("Insufficient funds: required {required} (value + fee), available {available}")]
    InsufficientFunds {
        /// Required amount in display units
        required: String,
        /// Actual balance in display units
        available: String,
        value: U256,
        fee: U256,
        balance: U256,
    },

    /// Zero reserve or zero supply; a minimum output cannot be bounded
    #[error("Degenerate reserves in pool {pool:?}: total_supply={total_supply}, reserve_native={reserve_native}")]
    DegenerateReserves {
        pool: Address,
        total_supply: U256,
        reserve_native: U256,
    },

    /// Withdrawal invoked without a position from a successful deposit
    #[error("No position to withdraw: deposit did not complete")]
    MissingPosition,

    /// LP balance is zero
    #[error("Nothing to withdraw: LP balance of {owner:?} in pool {pool:?} is zero")]
    NothingToWithdraw { pool: Address, owner: Address },

    /// Router allowance could not be raised
    #[error("Approval of {amount} LP ({token:?}) for spender {spender:?} failed: {reason}")]
    ApprovalFailed {
        token: Address,
        spender: Address,
        amount: U256,
        tx_hash: Option<H256>,
        reason: String,
    },

    /// Transaction was mined with a failure status
    #[error("{label} transaction {tx_hash:?} reverted in block {block_number}")]
    TransactionReverted {
        label: &'static str,
        tx_hash: H256,
        block_number: u64,
    },

    /// No receipt within the confirmation window
    #[error("{label} transaction {tx_hash:?} not confirmed after {waited_secs}s")]
    TransactionTimedOut {
        label: &'static str,
        tx_hash: H256,
        waited_secs: u64,
    },

    /// Recovered signer does not match the expected account
    #[error("Invalid permit signature: expected signer {expected:?}, recovered {recovered:?}")]
    InvalidSignature {
        expected: Address,
        recovered: Option<Address>,
    },

    /// Non-degenerate slippage math failure (overflow, bad tolerance)
    #[error("Slippage calculation failed: {0}")]
    Slippage(SlippageError),

    /// Contract descriptor could not be parsed
    #[error("Invalid contract descriptor: {0}")]
    Descriptor(#[from] ParseError),

    /// Call data could not be encoded or return data decoded
    #[error("ABI error: {0}")]
    Abi(#[from] AbiError),

    /// Typed-data encoding failure
    #[error("Typed data error: {0}")]
    TypedData(String),

    /// RPC or transport failure from the chain client
    #[error("Chain client error: {0:#}")]
    Chain(#[from] anyhow::Error),
}

impl CycleError {
    /// Map a slippage failure on `pool`, keeping degenerate reserves distinct
    pub fn from_slippage(pool: Address, err: SlippageError) -> Self {
        match err {
            SlippageError::DegenerateReserves {
                total_supply,
                reserve_native,
            } => Self::DegenerateReserves {
                pool,
                total_supply,
                reserve_native,
            },
            other => Self::Slippage(other),
        }
    }

    pub fn insufficient_funds(value: U256, fee: U256, balance: U256) -> Self {
        let required = value.saturating_add(fee);
        Self::InsufficientFunds {
            required: format_ether(required),
            available: format_ether(balance),
            value,
            fee,
            balance,
        }
    }
}
