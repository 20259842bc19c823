//! # Pool Cycle - Native Liquidity Lifecycle
//!
//! ## Purpose
//!
//! Drives one liquidity position through its full lifecycle on a SyncSwap-style
//! classic pool: deposit native currency through the router, then burn the
//! whole LP balance single-sided back to native currency. Every
//! state-changing call is guarded by a balance check and a minimum-output
//! bound computed from the pool's reserves.
//!
//! ## Integration Points
//!
//! - **Configuration**: `poolcycle-config` settings and registries, typed by [`config::CycleConfig`]
//! - **Math**: `poolcycle-amm` slippage bounds over a [`poolcycle_amm::ReserveSnapshot`]
//! - **Chain**: the [`chain::ChainClient`] trait; [`rpc_client::EthersChainClient`] in production
//! - **Authorisation**: on-chain approval ([`approval`]) or EIP-712 permit ([`permit`])
//!
//! ## Architecture Role
//!
//! ```text
//! CycleConfig → [DepositOrchestrator] → PositionHandle → [WithdrawalOrchestrator] → WithdrawalReceipt
//!                  ↓                                        ↓
//!          getPool / guard / snapshot             guard / balanceOf / snapshot
//!          addLiquidity2 + confirm                approve-or-permit / burn + confirm
//! ```
//!
//! Failures are typed [`error::CycleError`]s and terminal for the leg; nothing
//! is retried internally.

pub mod approval;
pub mod balance_guard;
pub mod chain;
pub mod config;
pub mod contracts;
pub mod credential;
pub mod cycle;
pub mod deposit;
pub mod error;
pub mod gas_price;
pub mod logging;
pub mod permit;
pub mod pool;
pub mod position;
pub mod rpc_client;
pub mod testing;
pub mod withdraw;

pub use approval::{ApprovalGate, ApprovalOutcome};
pub use chain::{ChainClient, ContractCall, TxOutcome};
pub use config::CycleConfig;
pub use cycle::{CycleReport, CycleRunner};
pub use deposit::DepositOrchestrator;
pub use error::{CycleError, Result};
pub use pool::{PoolContracts, PoolReference};
pub use position::PositionHandle;
pub use rpc_client::{ChainClientConfig, EthersChainClient};
pub use withdraw::{Authorization, WithdrawalOrchestrator, WithdrawalReceipt};
