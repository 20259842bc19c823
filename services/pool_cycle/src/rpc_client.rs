//! # Ethers Chain Client - JSON-RPC Transport
//!
//! ## Purpose
//!
//! Production [`ChainClient`]: an `ethers` HTTP provider over a pooled
//! (optionally proxied) `reqwest` client, the run's [`SigningCredential`], and
//! a [`GasPriceFetcher`] for fee estimates.
//!
//! ## Transaction Path
//!
//! ```text
//! ContractCall → [nonce + gas price + gas limit] → [sign off-thread] → eth_sendRawTransaction
//!                                                                       ↓
//!                                       receipt polling until status / confirmation timeout
//! ```
//!
//! Transactions are legacy (`TransactionRequest` wrapped in a `TypedTransaction`)
//! with EIP-155 chain id, signed locally and broadcast raw.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use ethers::prelude::*;
use ethers::providers::Http;
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::transaction::eip712::{Eip712, TypedData};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

use crate::chain::{ChainClient, ContractCall, TxOutcome};
use crate::credential::SigningCredential;
use crate::gas_price::{GasPriceFetcher, DEFAULT_FEE_GAS_UNITS};
use crate::logging::LogEmoji;

/// Connection and confirmation settings for [`EthersChainClient`]
#[derive(Debug, Clone)]
pub struct ChainClientConfig {
    pub rpc_url: String,
    /// Explorer base URL; transaction links are `{explorer_url}/tx/{hash}`
    pub explorer_url: Option<String>,
    /// HTTP(S) proxy for all RPC traffic
    pub proxy: Option<String>,
    /// Expected chain id; the node must agree
    pub chain_id: u64,
    pub confirmation_timeout: Duration,
    pub poll_interval: Duration,
    /// Gas units the fee estimate budgets per transaction
    pub fee_gas_units: u64,
    /// Fixed gas limit; `None` asks the node per transaction
    pub gas_limit: Option<u64>,
    pub request_timeout: Duration,
}

impl Default for ChainClientConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            explorer_url: None,
            proxy: None,
            chain_id: 1,
            confirmation_timeout: Duration::from_secs(300),
            poll_interval: Duration::from_millis(500),
            fee_gas_units: DEFAULT_FEE_GAS_UNITS,
            gas_limit: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// `ChainClient` over an ethers HTTP provider
pub struct EthersChainClient {
    config: ChainClientConfig,
    provider: Arc<Provider<Http>>,
    credential: SigningCredential,
    gas_price: GasPriceFetcher,
}

impl EthersChainClient {
    /// Build the transport and check the node serves the configured chain
    pub async fn connect(config: ChainClientConfig, credential: SigningCredential) -> Result<Self> {
        let init_start = Instant::now();
        crate::log_network!("Connecting to RPC endpoint {}", config.rpc_url);

        let mut builder = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(5)
            .timeout(config.request_timeout)
            .tcp_keepalive(Duration::from_secs(60))
            .tcp_nodelay(true);
        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy).context("Invalid proxy URL")?);
            info!("   - Proxy: enabled");
        }
        let http_client = builder.build().context("Failed to create HTTP client")?;

        let url: Url = config.rpc_url.parse().context("Invalid RPC URL")?;
        let provider = Arc::new(Provider::<Http>::new(Http::new_with_client(url, http_client)));

        let node_chain_id = provider
            .get_chainid()
            .await
            .context("Failed to query chain id")?;
        if node_chain_id != U256::from(config.chain_id) {
            bail!(
                "RPC endpoint serves chain {} but network is configured for chain {}",
                node_chain_id,
                config.chain_id
            );
        }
        if credential.chain_id() != config.chain_id {
            bail!(
                "Signing credential bound to chain {} but network is chain {}",
                credential.chain_id(),
                config.chain_id
            );
        }

        let gas_price = GasPriceFetcher::new(provider.clone(), config.fee_gas_units);

        info!(
            "✅ Chain client ready in {}ms (chain {}, account {:?})",
            init_start.elapsed().as_millis(),
            config.chain_id,
            credential.address()
        );
        Ok(Self {
            config,
            provider,
            credential,
            gas_price,
        })
    }

    async fn build_transaction(&self, call: &ContractCall) -> Result<TypedTransaction> {
        let from = self.credential.address();
        let (nonce, gas_price) = tokio::try_join!(
            async {
                self.provider
                    .get_transaction_count(from, Some(BlockNumber::Pending.into()))
                    .await
                    .context("Failed to fetch nonce")
            },
            self.gas_price.get_gas_price_wei()
        )?;

        let mut tx: TypedTransaction = TransactionRequest::new()
            .from(from)
            .to(call.to)
            .data(call.data.clone())
            .value(call.value)
            .nonce(nonce)
            .gas_price(gas_price)
            .chain_id(self.config.chain_id)
            .into();

        let gas = match self.config.gas_limit {
            Some(limit) => U256::from(limit),
            None => self
                .provider
                .estimate_gas(&tx, None)
                .await
                .with_context(|| format!("Gas estimation failed for {}", call.label))?,
        };
        tx.set_gas(gas);

        debug!(
            "🏗️ Built {} transaction: nonce={}, gas={}, gas_price={}",
            call.label, nonce, gas, gas_price
        );
        Ok(tx)
    }
}

#[async_trait]
impl ChainClient for EthersChainClient {
    fn address(&self) -> Address {
        self.credential.address()
    }

    async fn native_balance(&self) -> Result<U256> {
        self.provider
            .get_balance(self.credential.address(), None)
            .await
            .context("Failed to fetch native balance")
    }

    async fn estimate_fee(&self) -> Result<U256> {
        self.gas_price.estimate_fee().await
    }

    async fn chain_id(&self) -> Result<U256> {
        Ok(U256::from(self.config.chain_id))
    }

    async fn block_number(&self) -> Result<u64> {
        let block = self
            .provider
            .get_block_number()
            .await
            .context("Failed to fetch block number")?;
        Ok(block.as_u64())
    }

    async fn call(&self, to: Address, data: Bytes, block: Option<u64>) -> Result<Bytes> {
        let tx: TypedTransaction = TransactionRequest::new().to(to).data(data).into();
        let block = block.map(|n| BlockId::Number(BlockNumber::Number(n.into())));
        self.provider
            .call(&tx, block)
            .await
            .with_context(|| format!("eth_call to {:?} failed", to))
    }

    async fn submit(&self, call: ContractCall) -> Result<H256> {
        let tx = self.build_transaction(&call).await?;
        let signature = self.credential.sign_transaction(tx.clone()).await?;
        let raw_tx = tx.rlp_signed(&signature);

        let pending = self
            .provider
            .send_raw_transaction(raw_tx)
            .await
            .with_context(|| format!("Failed to broadcast {} transaction", call.label))?;
        Ok(pending.tx_hash())
    }

    async fn await_confirmation(&self, tx_hash: H256) -> Result<TxOutcome> {
        debug!("⏳ Monitoring confirmation for tx: {:?}", tx_hash);
        let start_time = Instant::now();

        loop {
            if start_time.elapsed() > self.config.confirmation_timeout {
                warn!(
                    "{} Transaction {:?} not confirmed after {}s",
                    LogEmoji::TIMEOUT,
                    tx_hash,
                    self.config.confirmation_timeout.as_secs()
                );
                return Ok(TxOutcome::TimedOut {
                    waited_secs: start_time.elapsed().as_secs(),
                });
            }

            match self.provider.get_transaction_receipt(tx_hash).await {
                Ok(Some(receipt)) => {
                    let block_number = receipt.block_number.map(|b| b.as_u64()).unwrap_or_default();
                    return Ok(if receipt.status == Some(U64::from(1u64)) {
                        TxOutcome::Confirmed { block_number }
                    } else {
                        TxOutcome::Reverted { block_number }
                    });
                }
                Ok(None) => {}
                Err(e) => debug!("Receipt poll failed, retrying: {}", e),
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    async fn sign_typed_data(&self, data: &TypedData) -> Result<Signature> {
        let digest = data.encode_eip712().context("Failed to hash typed data")?;
        self.credential.sign_digest(H256::from(digest)).await
    }

    fn explorer_tx_url(&self, tx_hash: H256) -> Option<String> {
        self.config
            .explorer_url
            .as_ref()
            .map(|base| format!("{}/tx/{:?}", base.trim_end_matches('/'), tx_hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ChainClientConfig::default();
        assert_eq!(config.confirmation_timeout, Duration::from_secs(300));
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.fee_gas_units, DEFAULT_FEE_GAS_UNITS);
        assert!(config.gas_limit.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_fails_to_connect() {
        let credential =
            SigningCredential::from_private_key(crate::testing::TEST_PRIVATE_KEY, 1).unwrap();
        let config = ChainClientConfig {
            rpc_url: "http://127.0.0.1:1".to_string(),
            request_timeout: Duration::from_secs(2),
            ..Default::default()
        };
        assert!(EthersChainClient::connect(config, credential).await.is_err());
    }

    #[tokio::test]
    async fn test_invalid_proxy_rejected() {
        let credential =
            SigningCredential::from_private_key(crate::testing::TEST_PRIVATE_KEY, 1).unwrap();
        let config = ChainClientConfig {
            proxy: Some("::not a url::".to_string()),
            ..Default::default()
        };
        let err = EthersChainClient::connect(config, credential).await.err().unwrap();
        assert!(format!("{err:#}").contains("proxy"), "{err:#}");
    }
}
