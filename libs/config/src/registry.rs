//! Network and token lookup tables
//!
//! Two JSON documents ship alongside the settings file:
//!
//! ```json
//! // networks.json
//! { "zksync": { "chain_id": 324, "rpc_url": "...", "explorer_url": "...",
//!               "factory_address": "0x...", "router_address": "0x..." } }
//!
//! // tokens.json
//! { "zksync": { "WETH": "0x...", "USDC": "0x..." } }
//! ```

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::settings::RunSettings;

/// Chain endpoints and protocol contract addresses for one network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub chain_id: u64,
    pub rpc_url: String,
    pub explorer_url: String,
    pub factory_address: String,
    pub router_address: String,
}

/// Network name → network info
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkRegistry(HashMap<String, NetworkInfo>);

/// Network name → token symbol → token address
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenRegistry(HashMap<String, HashMap<String, String>>);

/// Settings joined with both registries, ready for the chain layer
#[derive(Debug, Clone)]
pub struct ResolvedRun {
    pub settings: RunSettings,
    pub network: NetworkInfo,
    pub token_a_address: String,
    pub token_b_address: String,
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {:?}", path))
}

/// `0x` followed by 40 hex characters
pub fn is_hex_address(value: &str) -> bool {
    value
        .strip_prefix("0x")
        .map(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false)
}

impl NetworkRegistry {
    pub fn from_file(path: &Path) -> Result<Self> {
        read_json(path)
    }

    pub fn get(&self, name: &str) -> Option<&NetworkInfo> {
        self.0.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, info: NetworkInfo) {
        self.0.insert(name.into(), info);
    }
}

impl TokenRegistry {
    pub fn from_file(path: &Path) -> Result<Self> {
        read_json(path)
    }

    pub fn get(&self, network: &str, symbol: &str) -> Option<&str> {
        self.0
            .get(network)
            .and_then(|tokens| tokens.get(symbol))
            .map(String::as_str)
    }

    pub fn insert(
        &mut self,
        network: impl Into<String>,
        symbol: impl Into<String>,
        address: impl Into<String>,
    ) {
        self.0
            .entry(network.into())
            .or_default()
            .insert(symbol.into(), address.into());
    }
}

impl ResolvedRun {
    /// Validate settings and look up the network and both tokens
    pub fn resolve(
        settings: RunSettings,
        networks: &NetworkRegistry,
        tokens: &TokenRegistry,
    ) -> Result<Self> {
        settings.validate()?;

        let network = networks
            .get(&settings.network)
            .cloned()
            .ok_or_else(|| anyhow!("Network {} not found in network registry", settings.network))?;

        for (field, value) in [
            ("factory_address", &network.factory_address),
            ("router_address", &network.router_address),
        ] {
            if !is_hex_address(value) {
                bail!("Network {}: invalid {} {}", settings.network, field, value);
            }
        }

        let lookup = |symbol: &str| -> Result<String> {
            let address = tokens.get(&settings.network, symbol).ok_or_else(|| {
                anyhow!("Token {} not found on network {}", symbol, settings.network)
            })?;
            if !is_hex_address(address) {
                bail!("Token {} has invalid address {}", symbol, address);
            }
            Ok(address.to_string())
        };

        let token_a_address = lookup(&settings.token_a)?;
        let token_b_address = lookup(&settings.token_b)?;

        Ok(Self {
            settings,
            network,
            token_a_address,
            token_b_address,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ExecutionSettings;
    use rust_decimal_macros::dec;
    use std::fs;
    use tempfile::tempdir;

    const WETH: &str = "0x5aea5775959fbc2557cc8789bc1bf90a239d9a91";
    const USDC: &str = "0x3355df6d4c9c3035724fd0e3914de96a5a83aaf4";

    fn settings() -> RunSettings {
        RunSettings {
            network: "zksync".to_string(),
            token_a: "WETH".to_string(),
            token_b: "USDC".to_string(),
            amount: dec!(0.001),
            private_key: "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318"
                .to_string(),
            proxy: None,
            execution: ExecutionSettings::default(),
        }
    }

    fn registries() -> (NetworkRegistry, TokenRegistry) {
        let mut networks = NetworkRegistry::default();
        networks.insert(
            "zksync",
            NetworkInfo {
                chain_id: 324,
                rpc_url: "https://mainnet.era.zksync.io".to_string(),
                explorer_url: "https://explorer.zksync.io/".to_string(),
                factory_address: "0xf2dad89f2788a8cd54625c60b55cd3d2d0aca7cb".to_string(),
                router_address: "0x2da10a1e27bf85cedd8ffb1abbe97e53391c0295".to_string(),
            },
        );
        let mut tokens = TokenRegistry::default();
        tokens.insert("zksync", "WETH", WETH);
        tokens.insert("zksync", "USDC", USDC);
        (networks, tokens)
    }

    #[test]
    fn test_resolve_run() {
        let (networks, tokens) = registries();
        let run = ResolvedRun::resolve(settings(), &networks, &tokens).unwrap();
        assert_eq!(run.network.chain_id, 324);
        assert_eq!(run.token_a_address, WETH);
        assert_eq!(run.token_b_address, USDC);
        assert_eq!(run.network.explorer_url, "https://explorer.zksync.io/");
    }

    #[test]
    fn test_unknown_network_and_token() {
        let (networks, tokens) = registries();

        let mut s = settings();
        s.network = "linea".to_string();
        let err = ResolvedRun::resolve(s, &networks, &tokens).unwrap_err();
        assert!(err.to_string().contains("linea"));

        let mut s = settings();
        s.token_b = "DAI".to_string();
        let err = ResolvedRun::resolve(s, &networks, &tokens).unwrap_err();
        assert!(err.to_string().contains("DAI"));
    }

    #[test]
    fn test_registry_files() {
        let dir = tempdir().unwrap();
        let networks_path = dir.path().join("networks.json");
        let tokens_path = dir.path().join("tokens.json");

        let (networks, tokens) = registries();
        fs::write(&networks_path, serde_json::to_string(&networks).unwrap()).unwrap();
        fs::write(&tokens_path, serde_json::to_string(&tokens).unwrap()).unwrap();

        let networks = NetworkRegistry::from_file(&networks_path).unwrap();
        let tokens = TokenRegistry::from_file(&tokens_path).unwrap();
        assert_eq!(networks.get("zksync").unwrap().chain_id, 324);
        assert_eq!(tokens.get("zksync", "USDC"), Some(USDC));
        assert_eq!(tokens.get("zksync", "DAI"), None);
    }

    #[test]
    fn test_hex_address() {
        assert!(is_hex_address(WETH));
        assert!(!is_hex_address("5aea5775959fbc2557cc8789bc1bf90a239d9a91"));
        assert!(!is_hex_address("0x1234"));
    }
}
