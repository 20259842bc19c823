//! Signing credential
//!
//! Owns the account key for the lifetime of the run. Signing happens on a
//! blocking worker; the worker gets a clone of the `Arc` and drops it when done.

use anyhow::{Context, Result};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Signature, H256};
use std::fmt;
use std::sync::Arc;

/// Account key; not `Clone`, never printed
pub struct SigningCredential {
    wallet: Arc<LocalWallet>,
}

impl fmt::Debug for SigningCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningCredential")
            .field("address", &self.wallet.address())
            .field("key", &"<redacted>")
            .finish()
    }
}

impl SigningCredential {
    /// Parse a hex private key (with or without `0x`) bound to `chain_id`
    pub fn from_private_key(private_key: &str, chain_id: u64) -> Result<Self> {
        let wallet = private_key
            .trim()
            .parse::<LocalWallet>()
            .context("Invalid private key format")?
            .with_chain_id(chain_id);
        Ok(Self {
            wallet: Arc::new(wallet),
        })
    }

    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    pub fn chain_id(&self) -> u64 {
        self.wallet.chain_id()
    }

    /// Sign a transaction (EIP-155 replay protection from the wallet's chain id)
    pub async fn sign_transaction(&self, tx: TypedTransaction) -> Result<Signature> {
        let wallet = Arc::clone(&self.wallet);
        let signature = tokio::task::spawn_blocking(move || wallet.sign_transaction_sync(&tx))
            .await
            .context("Signing task failed")??;
        Ok(signature)
    }

    /// Sign a 32-byte digest without any prefix
    pub async fn sign_digest(&self, digest: H256) -> Result<Signature> {
        let wallet = Arc::clone(&self.wallet);
        let signature = tokio::task::spawn_blocking(move || wallet.sign_hash(digest))
            .await
            .context("Signing task failed")??;
        Ok(signature)
    }
}
