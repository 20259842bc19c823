//! # Pool Cycle Configuration - Typed Run Parameters
//!
//! ## Purpose
//!
//! Turns a [`ResolvedRun`] (string settings joined with the network and token
//! registries) into the typed values the orchestrators and chain client take:
//! parsed addresses, the amount in wei, the slippage tolerance, timeouts.
//!
//! ```text
//! settings.toml + POOL_CYCLE_* env → RunSettings ─┐
//! networks.json → NetworkRegistry ────────────────┼→ ResolvedRun → CycleConfig
//! tokens.json   → TokenRegistry ──────────────────┘
//! ```

use anyhow::{Context, Result};
use ethers::types::{Address, U256};
use ethers::utils::parse_ether;
use poolcycle_amm::SlippageTolerance;
use poolcycle_config::{AuthorizationMode, ResolvedRun};
use std::sync::Arc;
use std::time::Duration;

use crate::contracts::ContractDescriptors;
use crate::credential::SigningCredential;
use crate::pool::PoolContracts;
use crate::rpc_client::ChainClientConfig;

/// Everything a cycle run needs, fully typed
#[derive(Debug)]
pub struct CycleConfig {
    /// Network name, for logs
    pub network: String,
    pub contracts: PoolContracts,
    /// Deposit amount in wei
    pub amount: U256,
    pub tolerance: SlippageTolerance,
    pub authorization: AuthorizationMode,
    pub client: ChainClientConfig,
    pub credential: SigningCredential,
}

fn parse_address(field: &str, value: &str) -> Result<Address> {
    value
        .parse::<Address>()
        .with_context(|| format!("Invalid {} address: {}", field, value))
}

impl CycleConfig {
    pub fn from_resolved(run: ResolvedRun) -> Result<Self> {
        let ResolvedRun {
            settings,
            network,
            token_a_address,
            token_b_address,
        } = run;
        let execution = &settings.execution;

        let contracts = PoolContracts {
            factory: parse_address("factory", &network.factory_address)?,
            router: parse_address("router", &network.router_address)?,
            token_a: parse_address("token_a", &token_a_address)?,
            token_b: parse_address("token_b", &token_b_address)?,
            abi: Arc::new(ContractDescriptors::classic().context("Invalid contract descriptors")?),
        };

        let amount = parse_ether(settings.amount.normalize().to_string())
            .with_context(|| format!("Invalid deposit amount: {}", settings.amount))?;

        let tolerance = SlippageTolerance::from_bps(execution.slippage_tolerance_bps)
            .context("Invalid slippage tolerance")?;

        let credential =
            SigningCredential::from_private_key(&settings.private_key, network.chain_id)?;

        let client = ChainClientConfig {
            rpc_url: network.rpc_url.clone(),
            explorer_url: Some(network.explorer_url.clone()).filter(|url| !url.is_empty()),
            proxy: settings.proxy.clone(),
            chain_id: network.chain_id,
            confirmation_timeout: Duration::from_secs(execution.confirmation_timeout_secs),
            poll_interval: Duration::from_millis(execution.poll_interval_ms),
            fee_gas_units: execution.fee_gas_units,
            gas_limit: execution.gas_limit,
            ..Default::default()
        };

        Ok(Self {
            network: settings.network.clone(),
            contracts,
            amount,
            tolerance,
            authorization: execution.authorization,
            client,
            credential,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TEST_PRIVATE_KEY;
    use poolcycle_config::{ExecutionSettings, NetworkInfo, RunSettings};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn resolved(amount: &str) -> ResolvedRun {
        ResolvedRun {
            settings: RunSettings {
                network: "zksync".to_string(),
                token_a: "WETH".to_string(),
                token_b: "USDC".to_string(),
                amount: Decimal::from_str(amount).unwrap(),
                private_key: TEST_PRIVATE_KEY.to_string(),
                proxy: None,
                execution: ExecutionSettings::default(),
            },
            network: NetworkInfo {
                chain_id: 324,
                rpc_url: "https://mainnet.era.zksync.io".to_string(),
                explorer_url: "https://explorer.zksync.io/".to_string(),
                factory_address: "0xf2DAd89f2788a8CD54625C60b55cD3d2D0ACa7Cb".to_string(),
                router_address: "0x2da10A1e27bF85cEdD8FFb1AbBe97e53391C0295".to_string(),
            },
            token_a_address: "0x5AEa5775959fBC2557Cc8789bC1bf90A239D9a91".to_string(),
            token_b_address: "0x3355df6D4c9C3035724Fd0e3914dE96A5a83aaf4".to_string(),
        }
    }

    #[test]
    fn test_amount_converted_to_wei() {
        let config = CycleConfig::from_resolved(resolved("0.0001")).unwrap();
        assert_eq!(config.amount, U256::from(100_000_000_000_000u64));
        assert_eq!(config.tolerance, SlippageTolerance::default());
        assert_eq!(config.authorization, AuthorizationMode::Approve);
        assert_eq!(config.credential.chain_id(), 324);
    }

    #[test]
    fn test_client_settings_carried_over() {
        let config = CycleConfig::from_resolved(resolved("1")).unwrap();
        assert_eq!(config.amount, U256::exp10(18));
        assert_eq!(config.client.chain_id, 324);
        assert_eq!(config.client.confirmation_timeout, Duration::from_secs(300));
        assert_eq!(
            config.client.explorer_url.as_deref(),
            Some("https://explorer.zksync.io/")
        );
    }

    #[test]
    fn test_bad_router_address_rejected() {
        let mut run = resolved("1");
        run.network.router_address = "0x1234".to_string();
        let err = CycleConfig::from_resolved(run).unwrap_err();
        assert!(format!("{err:#}").contains("router"), "{err:#}");
    }
}
