//! # Pool Cycle AMM Math
//!
//! ## Purpose
//!
//! Exact integer math for the minimum outputs a classic two-asset pool
//! deposit or withdrawal is allowed to accept. Everything is `U256` in the
//! chain's smallest unit; there is no floating point anywhere.
//!
//! ## Integration Points
//!
//! - **Input**: a [`ReserveSnapshot`] read by the pool cycle service at one block
//! - **Output**: `minLiquidity` / `minAmount` arguments for the router calls
//! - **Tolerance**: [`SlippageTolerance`] in basis points, validated on construction
//!
//! ```rust
//! use ethers_core::types::U256;
//! use poolcycle_amm::{ReserveSnapshot, SlippageTolerance};
//!
//! let snapshot = ReserveSnapshot::new(U256::from(5_000_000u64), U256::from(10_000_000u64), 1);
//! let min_lp = snapshot
//!     .min_lp_out(U256::from(1_000_000u64), SlippageTolerance::default())
//!     .unwrap();
//! assert_eq!(min_lp, U256::from(245_000u64));
//! ```

pub mod slippage;

pub use slippage::{ReserveSnapshot, SlippageError, SlippageTolerance, BPS_DENOMINATOR};
