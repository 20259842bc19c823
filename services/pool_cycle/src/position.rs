//! Position handle carried from the deposit leg to the withdrawal leg

use ethers::types::{Address, H256, U256};

use crate::pool::PoolReference;

/// Proof of a confirmed deposit and everything the withdrawal needs
///
/// Only [`crate::deposit::DepositOrchestrator`] constructs this, and only after
/// the deposit transaction is confirmed. It holds no live resources.
#[derive(Debug, Clone)]
pub struct PositionHandle {
    pool: PoolReference,
    reference_token: Address,
    deposit_tx: H256,
    deposited: U256,
    min_lp_out: U256,
}

impl PositionHandle {
    pub(crate) fn new(
        pool: PoolReference,
        deposit_tx: H256,
        deposited: U256,
        min_lp_out: U256,
    ) -> Self {
        let reference_token = pool.token_a;
        Self {
            pool,
            reference_token,
            deposit_tx,
            deposited,
            min_lp_out,
        }
    }

    pub fn pool(&self) -> &PoolReference {
        &self.pool
    }

    /// Token the withdrawal is denominated in
    pub fn reference_token(&self) -> Address {
        self.reference_token
    }

    pub fn deposit_tx(&self) -> H256 {
        self.deposit_tx
    }

    /// Native amount deposited, in wei
    pub fn deposited(&self) -> U256 {
        self.deposited
    }

    /// LP floor the deposit was submitted with
    pub fn min_lp_out(&self) -> U256 {
        self.min_lp_out
    }
}
