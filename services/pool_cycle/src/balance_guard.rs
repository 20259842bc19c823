//! Native balance precondition for every lifecycle transaction

use ethers::types::U256;
use ethers::utils::format_ether;
use tracing::debug;

use crate::chain::ChainClient;
use crate::error::{CycleError, Result};

/// Succeeds only when `balance >= value + fee`
pub fn check_affordable(value: U256, fee: U256, balance: U256) -> Result<()> {
    match value.checked_add(fee) {
        Some(required) if balance >= required => Ok(()),
        _ => Err(CycleError::insufficient_funds(value, fee, balance)),
    }
}

/// Read balance and fee estimate, then apply [`check_affordable`]
///
/// The two reads run concurrently. A failed read is returned as-is; the guard
/// does not retry. Returns the fee estimate that was checked against.
pub async fn ensure_affordable<C: ChainClient + ?Sized>(client: &C, value: U256) -> Result<U256> {
    let (fee, balance) = tokio::try_join!(client.estimate_fee(), client.native_balance())?;

    check_affordable(value, fee, balance)?;

    debug!(
        "💰 Balance {} covers value {} + fee {}",
        format_ether(balance),
        format_ether(value),
        format_ether(fee)
    );
    Ok(fee)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockChainClient;

    #[test]
    fn test_boundary_is_inclusive() {
        let fee = U256::from(21_000u64);
        assert!(check_affordable(U256::from(100u64), fee, U256::from(21_100u64)).is_ok());
        assert!(check_affordable(U256::from(100u64), fee, U256::from(21_099u64)).is_err());
        assert!(check_affordable(U256::zero(), fee, fee).is_ok());
    }

    #[test]
    fn test_balance_equal_to_fee_rejects_any_value() {
        let fee = U256::from(1_000u64);
        let err = check_affordable(U256::one(), fee, fee).unwrap_err();
        match err {
            CycleError::InsufficientFunds { value, fee: f, balance, .. } => {
                assert_eq!(value, U256::one());
                assert_eq!(f, fee);
                assert_eq!(balance, fee);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_overflowing_requirement_rejects() {
        assert!(check_affordable(U256::MAX, U256::one(), U256::MAX).is_err());
    }

    #[tokio::test]
    async fn test_ensure_affordable_reads_client() {
        let mock = MockChainClient::new();
        mock.set_native_balance(U256::from(10_000u64));
        mock.set_fee(U256::from(1_000u64));

        assert_eq!(
            ensure_affordable(&mock, U256::from(9_000u64)).await.unwrap(),
            U256::from(1_000u64)
        );
        assert!(matches!(
            ensure_affordable(&mock, U256::from(9_001u64)).await,
            Err(CycleError::InsufficientFunds { .. })
        ));
    }

    #[tokio::test]
    async fn test_read_failure_propagates() {
        let mock = MockChainClient::new();
        mock.fail_balance_reads(true);
        assert!(matches!(
            ensure_affordable(&mock, U256::zero()).await,
            Err(CycleError::Chain(_))
        ));
    }
}
