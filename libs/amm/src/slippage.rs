//! Reserve-ratio minimum-output math for classic two-asset pools
//!
//! Both formulas work on a single [`ReserveSnapshot`] and are evaluated as one
//! exact rational with a floor at the end. Intermediate products are widened to
//! 512 bits so no `U256` input can overflow the multiplication step.
//!
//! The `/ 2` (deposit) and `* 2` (withdrawal) factors follow the classic pool
//! convention where a single-sided native deposit is valued against half of
//! the pool.

use ethers_core::types::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Basis-point denominator (10_000 = 100%)
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Default tolerance applied to minimum outputs (2%)
pub const DEFAULT_TOLERANCE_BPS: u32 = 200;

/// Errors produced by minimum-output calculations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlippageError {
    /// Reserve or supply is zero, so no meaningful floor exists
    #[error("Degenerate reserves: total_supply={total_supply}, reserve_native={reserve_native}")]
    DegenerateReserves {
        total_supply: U256,
        reserve_native: U256,
    },

    /// Tolerance must leave a non-zero share of the output
    #[error("Invalid slippage tolerance: {bps} bps (must be below {BPS_DENOMINATOR})")]
    InvalidTolerance { bps: u32 },

    /// Result does not fit back into 256 bits
    #[error("Arithmetic overflow computing minimum output")]
    Overflow,
}

/// Slippage tolerance in basis points (200 = 2%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct SlippageTolerance(u32);

impl SlippageTolerance {
    pub fn from_bps(bps: u32) -> Result<Self, SlippageError> {
        if bps >= BPS_DENOMINATOR {
            return Err(SlippageError::InvalidTolerance { bps });
        }
        Ok(Self(bps))
    }

    pub fn bps(&self) -> u32 {
        self.0
    }

    /// Share of the naive output that is kept, in basis points
    pub fn retained_bps(&self) -> u32 {
        BPS_DENOMINATOR - self.0
    }

    /// Tolerance as a percentage, for display
    pub fn as_percent(&self) -> Decimal {
        Decimal::from(self.0) / Decimal::from(100)
    }
}

impl Default for SlippageTolerance {
    fn default() -> Self {
        Self(DEFAULT_TOLERANCE_BPS)
    }
}

impl TryFrom<u32> for SlippageTolerance {
    type Error = SlippageError;

    fn try_from(bps: u32) -> Result<Self, Self::Error> {
        Self::from_bps(bps)
    }
}

impl From<SlippageTolerance> for u32 {
    fn from(tolerance: SlippageTolerance) -> Self {
        tolerance.0
    }
}

impl std::fmt::Display for SlippageTolerance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.as_percent())
    }
}

/// Total LP supply and native reserve observed at one chain state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReserveSnapshot {
    pub total_supply: U256,
    pub reserve_native: U256,
    /// Block the two values were read at
    pub block_number: u64,
}

impl ReserveSnapshot {
    pub fn new(total_supply: U256, reserve_native: U256, block_number: u64) -> Self {
        Self {
            total_supply,
            reserve_native,
            block_number,
        }
    }

    fn ensure_live(&self) -> Result<(), SlippageError> {
        if self.total_supply.is_zero() || self.reserve_native.is_zero() {
            return Err(SlippageError::DegenerateReserves {
                total_supply: self.total_supply,
                reserve_native: self.reserve_native,
            });
        }
        Ok(())
    }

    /// Minimum LP tokens accepted for a native deposit
    ///
    /// `floor(amount * total_supply / reserve_native / 2 * (1 - tolerance))`
    pub fn min_lp_out(
        &self,
        deposit_amount: U256,
        tolerance: SlippageTolerance,
    ) -> Result<U256, SlippageError> {
        self.ensure_live()?;
        let denominator_factor = U256::from(2u32) * U256::from(BPS_DENOMINATOR);
        mul_div_floor(
            deposit_amount,
            self.total_supply,
            U256::from(tolerance.retained_bps()),
            self.reserve_native,
            denominator_factor,
        )
    }

    /// Minimum native currency accepted when burning `lp_balance`
    ///
    /// `floor(lp_balance * reserve_native * 2 / total_supply * (1 - tolerance))`
    pub fn min_native_out(
        &self,
        lp_balance: U256,
        tolerance: SlippageTolerance,
    ) -> Result<U256, SlippageError> {
        self.ensure_live()?;
        let numerator_factor = U256::from(2u32) * U256::from(tolerance.retained_bps());
        mul_div_floor(
            lp_balance,
            self.reserve_native,
            numerator_factor,
            self.total_supply,
            U256::from(BPS_DENOMINATOR),
        )
    }
}

/// `floor(a * b * c / (d * e))` with 512-bit intermediates
fn mul_div_floor(a: U256, b: U256, c: U256, d: U256, e: U256) -> Result<U256, SlippageError> {
    let numerator = a
        .full_mul(b)
        .checked_mul(c.into())
        .ok_or(SlippageError::Overflow)?;
    let denominator = d.full_mul(e);
    if denominator.is_zero() {
        return Err(SlippageError::Overflow);
    }
    U256::try_from(numerator / denominator).map_err(|_| SlippageError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn snapshot(total_supply: u64, reserve_native: u64) -> ReserveSnapshot {
        ReserveSnapshot::new(U256::from(total_supply), U256::from(reserve_native), 1)
    }

    #[test]
    fn test_deposit_min_lp_out() {
        let snap = snapshot(5_000_000, 10_000_000);
        let min_lp = snap
            .min_lp_out(U256::from(1_000_000u64), SlippageTolerance::default())
            .unwrap();
        assert_eq!(min_lp, U256::from(245_000u64));
    }

    #[test]
    fn test_withdraw_min_native_out() {
        let snap = snapshot(5_000_000, 10_000_000);
        let min_native = snap
            .min_native_out(U256::from(245_000u64), SlippageTolerance::default())
            .unwrap();
        assert_eq!(min_native, U256::from(960_400u64));
    }

    #[test]
    fn test_zero_reserve_is_degenerate() {
        let snap = snapshot(5_000_000, 0);
        let tol = SlippageTolerance::default();
        assert!(matches!(
            snap.min_lp_out(U256::from(1u64), tol),
            Err(SlippageError::DegenerateReserves { .. })
        ));
        assert!(matches!(
            snap.min_native_out(U256::from(1u64), tol),
            Err(SlippageError::DegenerateReserves { .. })
        ));
    }

    #[test]
    fn test_zero_supply_is_degenerate() {
        let snap = snapshot(0, 10_000_000);
        let tol = SlippageTolerance::default();
        assert!(snap.min_lp_out(U256::from(1u64), tol).is_err());
        assert!(snap.min_native_out(U256::from(1u64), tol).is_err());
    }

    #[test]
    fn test_tolerance_bounds() {
        assert!(SlippageTolerance::from_bps(0).is_ok());
        assert!(SlippageTolerance::from_bps(9_999).is_ok());
        assert_eq!(
            SlippageTolerance::from_bps(10_000),
            Err(SlippageError::InvalidTolerance { bps: 10_000 })
        );
        assert_eq!(SlippageTolerance::default().to_string(), "2%");
    }

    #[test]
    fn test_percent_display_value() {
        assert_eq!(SlippageTolerance::from_bps(150).unwrap().as_percent(), dec!(1.5));
        assert_eq!(SlippageTolerance::from_bps(5).unwrap().as_percent(), dec!(0.05));
    }

    #[test]
    fn test_large_values_do_not_overflow() {
        // 1e24 supply against 1e24 wei reserve, 1e21 deposit
        let big = U256::exp10(24);
        let snap = ReserveSnapshot::new(big, big, 1);
        let min_lp = snap
            .min_lp_out(U256::exp10(21), SlippageTolerance::default())
            .unwrap();
        assert_eq!(min_lp, U256::exp10(21) * 49 / 100);
    }

    #[test]
    fn test_zero_tolerance_matches_naive_floor() {
        let snap = snapshot(7, 3);
        let tol = SlippageTolerance::from_bps(0).unwrap();
        // 10 * 7 / 3 / 2 = 11.66.. -> 11
        assert_eq!(snap.min_lp_out(U256::from(10u64), tol).unwrap(), U256::from(11u64));
    }
}
