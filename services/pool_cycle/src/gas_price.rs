//! # Gas Price Fetching - Network Fee Estimation
//!
//! ## Purpose
//!
//! Supplies the network-fee side of the balance guard: the node's current gas
//! price times a fixed gas-unit budget per lifecycle transaction. The same gas
//! price is reused when a transaction is built, so the guard and the submitted
//! transaction agree.
//!
//! ## Caching
//!
//! Gas price is cached for a short window to avoid a second RPC round-trip when
//! the guard and the transaction builder run back to back. A failed fetch is an
//! error; there is no default price to fall back to.

use anyhow::{anyhow, Context, Result};
use ethers::prelude::*;
use ethers::providers::Http;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::debug;

use crate::logging::LogEmoji;

/// Gas units budgeted per lifecycle transaction when nothing else is configured
pub const DEFAULT_FEE_GAS_UNITS: u64 = 500_000;

/// How long a fetched gas price is reused
const CACHE_DURATION: Duration = Duration::from_secs(15);

/// Per-request timeout for the gas price query
const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Copy)]
struct GasPriceCache {
    gas_price_wei: U256,
    fetched_at: Instant,
}

impl GasPriceCache {
    fn is_expired(&self, max_age: Duration) -> bool {
        self.fetched_at.elapsed() > max_age
    }
}

/// `gas_price * gas_units`, failing on overflow
pub fn fee_for(gas_price_wei: U256, gas_units: u64) -> Result<U256> {
    gas_price_wei
        .checked_mul(U256::from(gas_units))
        .ok_or_else(|| anyhow!("Fee overflow: gas price {} x {} units", gas_price_wei, gas_units))
}

/// Gas price fetcher with a short-lived cache
pub struct GasPriceFetcher {
    provider: Arc<Provider<Http>>,
    gas_units: u64,
    cache: RwLock<Option<GasPriceCache>>,
}

impl GasPriceFetcher {
    pub fn new(provider: Arc<Provider<Http>>, gas_units: u64) -> Self {
        Self {
            provider,
            gas_units,
            cache: RwLock::new(None),
        }
    }

    /// Current gas price in wei
    pub async fn get_gas_price_wei(&self) -> Result<U256> {
        let cached = *self.cache.read();
        if let Some(cached) = cached {
            if !cached.is_expired(CACHE_DURATION) {
                debug!("Using cached gas price: {} wei", cached.gas_price_wei);
                return Ok(cached.gas_price_wei);
            }
        }

        let gas_price = timeout(FETCH_TIMEOUT, self.provider.get_gas_price())
            .await
            .context("Gas price request timed out")?
            .context("Failed to fetch gas price")?;

        *self.cache.write() = Some(GasPriceCache {
            gas_price_wei: gas_price,
            fetched_at: Instant::now(),
        });
        debug!(
            "{} Fetched fresh gas price: {} wei ({} gwei)",
            LogEmoji::GAS,
            gas_price,
            gas_price / U256::exp10(9)
        );
        Ok(gas_price)
    }

    /// Estimated fee for one lifecycle transaction, in wei
    pub async fn estimate_fee(&self) -> Result<U256> {
        let gas_price = self.get_gas_price_wei().await?;
        fee_for(gas_price, self.gas_units)
    }
}
