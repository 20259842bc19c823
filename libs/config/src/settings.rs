//! Run Settings Module
//!
//! Loads the per-run settings for the pool cycle: which network and token pair
//! to use, how much native currency to cycle, and the signing key. Settings come
//! from a TOML file with `POOL_CYCLE_`-prefixed environment overrides, then
//! string fields that may reference environment variables are expanded.

use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Prefix for environment overrides (`POOL_CYCLE_PRIVATE_KEY`, `POOL_CYCLE_EXECUTION__GAS_LIMIT`)
pub const ENV_PREFIX: &str = "POOL_CYCLE";

/// How the router is authorised to pull LP tokens during withdrawal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthorizationMode {
    /// On-chain `approve` transaction, only when the allowance is short
    #[default]
    Approve,
    /// Off-chain EIP-712 permit passed along with the withdrawal call
    Permit,
}

/// Settings for one deposit/withdraw cycle
#[derive(Clone, Serialize, Deserialize)]
pub struct RunSettings {
    /// Network name, key into the network registry
    pub network: String,
    /// Symbol of the reference token (withdrawal output asset)
    pub token_a: String,
    /// Symbol of the paired token
    pub token_b: String,
    /// Deposit amount in display units (e.g. "0.001" ETH)
    pub amount: Decimal,
    /// Hex-encoded secp256k1 private key
    pub private_key: String,
    /// Optional HTTP(S) proxy for RPC traffic
    #[serde(default)]
    pub proxy: Option<String>,
    #[serde(default)]
    pub execution: ExecutionSettings,
}

/// Transaction execution parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionSettings {
    /// Slippage tolerance applied to minimum outputs (basis points, 200 = 2%)
    pub slippage_tolerance_bps: u32,
    /// Maximum wait for a transaction receipt (seconds)
    pub confirmation_timeout_secs: u64,
    /// Receipt polling interval (milliseconds)
    pub poll_interval_ms: u64,
    /// Gas units assumed when estimating the network fee up front
    pub fee_gas_units: u64,
    /// Fixed gas limit; estimated per transaction when unset
    pub gas_limit: Option<u64>,
    pub authorization: AuthorizationMode,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            slippage_tolerance_bps: 200, // 2%
            confirmation_timeout_secs: 300,
            poll_interval_ms: 500,
            fee_gas_units: 500_000,
            gas_limit: None,
            authorization: AuthorizationMode::Approve,
        }
    }
}

impl std::fmt::Debug for RunSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunSettings")
            .field("network", &self.network)
            .field("token_a", &self.token_a)
            .field("token_b", &self.token_b)
            .field("amount", &self.amount)
            .field("private_key", &"<redacted>")
            .field("proxy", &self.proxy)
            .field("execution", &self.execution)
            .finish()
    }
}

impl RunSettings {
    /// Load settings from a TOML file with environment overrides
    pub fn load(path: &Path) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path).required(true))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build run settings")?;

        let mut settings: Self = config
            .try_deserialize()
            .context("Failed to deserialize run settings")?;
        settings.expand_env_vars()?;

        debug!("Loaded run settings from {:?}: {:?}", path, settings);
        Ok(settings)
    }

    /// Expand `$VAR` / `${VAR}` references in secret-bearing fields
    pub fn expand_env_vars(&mut self) -> Result<()> {
        self.private_key = shellexpand::env(&self.private_key)
            .context("Failed to expand private_key")?
            .into_owned();

        if let Some(proxy) = &self.proxy {
            let expanded = shellexpand::env(proxy).context("Failed to expand proxy")?;
            self.proxy = Some(expanded.into_owned());
        }

        Ok(())
    }

    /// Validate and normalise before the settings reach the chain layer
    pub fn validate(&self) -> Result<()> {
        if self.network.trim().is_empty() {
            bail!("network must be set");
        }

        if self.amount <= Decimal::ZERO {
            bail!("amount must be positive, got {}", self.amount);
        }

        if self.token_a.eq_ignore_ascii_case(&self.token_b) {
            bail!("token_a and token_b must differ (both are {})", self.token_a);
        }

        let key = self.private_key.trim_start_matches("0x");
        if key.len() != 64 || !key.chars().all(|c| c.is_ascii_hexdigit()) {
            bail!("private_key must be 32 bytes of hex");
        }

        if let Some(proxy) = &self.proxy {
            if !(proxy.starts_with("http://")
                || proxy.starts_with("https://")
                || proxy.starts_with("socks5://"))
            {
                bail!("proxy must be an http(s):// or socks5:// URL");
            }
        }

        let exec = &self.execution;
        if exec.slippage_tolerance_bps >= 10_000 {
            bail!("slippage_tolerance_bps must be < 10000 (100%)");
        }

        if exec.confirmation_timeout_secs == 0 {
            bail!("confirmation_timeout_secs must be positive");
        }

        if exec.poll_interval_ms == 0 {
            bail!("poll_interval_ms must be positive");
        }

        if exec.fee_gas_units < 21_000 {
            bail!("fee_gas_units must be at least 21000");
        }

        if let Some(limit) = exec.gas_limit {
            if limit < 21_000 {
                bail!("gas_limit must be at least 21000");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::fs;
    use tempfile::tempdir;

    const KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    fn sample() -> RunSettings {
        RunSettings {
            network: "zksync".to_string(),
            token_a: "WETH".to_string(),
            token_b: "USDC".to_string(),
            amount: dec!(0.001),
            private_key: KEY.to_string(),
            proxy: None,
            execution: ExecutionSettings::default(),
        }
    }

    #[test]
    fn test_load_settings_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");

        fs::write(
            &path,
            format!(
                r#"
network = "zksync"
token_a = "WETH"
token_b = "USDC"
amount = "0.0025"
private_key = "{KEY}"

[execution]
slippage_tolerance_bps = 50
authorization = "permit"
"#
            ),
        )
        .unwrap();

        let settings = RunSettings::load(&path).unwrap();
        assert_eq!(settings.network, "zksync");
        assert_eq!(settings.amount, dec!(0.0025));
        assert_eq!(settings.execution.slippage_tolerance_bps, 50);
        assert_eq!(settings.execution.authorization, AuthorizationMode::Permit);
        // Unset fields keep defaults
        assert_eq!(settings.execution.confirmation_timeout_secs, 300);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_debug_redacts_key() {
        let rendered = format!("{:?}", sample());
        assert!(!rendered.contains(KEY.trim_start_matches("0x")));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut s = sample();
        s.amount = dec!(0);
        assert!(s.validate().is_err());

        let mut s = sample();
        s.token_b = "weth".to_string();
        assert!(s.validate().is_err());

        let mut s = sample();
        s.private_key = "0xdeadbeef".to_string();
        assert!(s.validate().is_err());

        let mut s = sample();
        s.execution.slippage_tolerance_bps = 10_000;
        assert!(s.validate().is_err());

        let mut s = sample();
        s.proxy = Some("ftp://proxy:21".to_string());
        assert!(s.validate().is_err());

        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_expand_private_key_from_env() {
        std::env::set_var("PC_SETTINGS_TEST_KEY", KEY);
        let mut s = sample();
        s.private_key = "${PC_SETTINGS_TEST_KEY}".to_string();
        s.expand_env_vars().unwrap();
        assert_eq!(s.private_key, KEY);
        std::env::remove_var("PC_SETTINGS_TEST_KEY");
    }
}
