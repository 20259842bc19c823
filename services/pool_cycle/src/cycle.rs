//! Deposit-then-withdraw cycle runner
//!
//! Runs the two legs strictly in order on one client. The withdrawal only
//! starts once the deposit has produced a position; a failed deposit means
//! the withdrawal leg reports [`CycleError::MissingPosition`].

use ethers::types::{H256, U256};
use ethers::utils::format_ether;
use poolcycle_amm::SlippageTolerance;
use poolcycle_config::AuthorizationMode;
use std::time::{Duration, Instant};

use crate::chain::ChainClient;
use crate::deposit::DepositOrchestrator;
use crate::error::{CycleError, Result};
use crate::pool::PoolContracts;
use crate::withdraw::{WithdrawalOrchestrator, WithdrawalReceipt};
use crate::{log_balance, log_error, log_success};

/// Outcome of one full cycle
#[derive(Debug)]
pub struct CycleReport {
    pub deposit_tx: Option<H256>,
    pub deposit: Result<()>,
    pub withdrawal: Result<WithdrawalReceipt>,
    pub balance_before: Option<U256>,
    pub balance_after: Option<U256>,
    pub elapsed: Duration,
}

impl CycleReport {
    /// Both legs confirmed
    pub fn succeeded(&self) -> bool {
        self.deposit.is_ok() && self.withdrawal.is_ok()
    }

    /// Net native change over the cycle, when both balances were read
    pub fn balance_change(&self) -> Option<(U256, bool)> {
        match (self.balance_before, self.balance_after) {
            (Some(before), Some(after)) if after >= before => Some((after - before, true)),
            (Some(before), Some(after)) => Some((before - after, false)),
            _ => None,
        }
    }
}

pub struct CycleRunner<'a, C: ChainClient + ?Sized> {
    client: &'a C,
    contracts: &'a PoolContracts,
    tolerance: SlippageTolerance,
    authorization: AuthorizationMode,
}

impl<'a, C: ChainClient + ?Sized> CycleRunner<'a, C> {
    pub fn new(
        client: &'a C,
        contracts: &'a PoolContracts,
        tolerance: SlippageTolerance,
        authorization: AuthorizationMode,
    ) -> Self {
        Self {
            client,
            contracts,
            tolerance,
            authorization,
        }
    }

    async fn read_balance(&self) -> Option<U256> {
        match self.client.native_balance().await {
            Ok(balance) => {
                log_balance!("Native balance: {}", format_ether(balance));
                Some(balance)
            }
            Err(e) => {
                log_error!("Balance read failed: {:#}", e);
                None
            }
        }
    }

    /// Deposit `amount` wei, then withdraw the resulting position
    pub async fn run(&self, amount: U256) -> CycleReport {
        let started = Instant::now();
        let balance_before = self.read_balance().await;

        let position = DepositOrchestrator::new(self.client, self.contracts, self.tolerance)
            .deposit(amount)
            .await;
        let (position, deposit) = match position {
            Ok(position) => (Some(position), Ok(())),
            Err(e) => {
                log_error!("Deposit failed: {}", e);
                (None, Err(e))
            }
        };

        let withdrawal = WithdrawalOrchestrator::new(
            self.client,
            self.tolerance,
            self.authorization,
        )
        .withdraw(position.as_ref())
        .await;
        match &withdrawal {
            Ok(receipt) => log_success!("Withdrawal confirmed: {:?}", receipt.tx_hash),
            Err(CycleError::MissingPosition) => {}
            Err(e) => log_error!("Withdrawal failed: {}", e),
        }

        let balance_after = self.read_balance().await;
        CycleReport {
            deposit_tx: position.map(|p| p.deposit_tx()),
            deposit,
            withdrawal,
            balance_before,
            balance_after,
            elapsed: started.elapsed(),
        }
    }
}
