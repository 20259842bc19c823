//! EIP-712 permit authorisation for the LP token
//!
//! Alternative to an on-chain `approve`: the caller signs a `Permit` for the
//! router and the withdrawal call carries the signature. The signature is
//! checked locally by recovering the signer before it is ever submitted.

use ethers::types::transaction::eip712::{Eip712, TypedData};
use ethers::types::{Address, Bytes, Signature, H256, U256};
use poolcycle_config::constants::PERMIT_VALIDITY_SECS;
use serde_json::json;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

use crate::chain::ChainClient;
use crate::contracts::PermitParams;
use crate::error::{CycleError, Result};
use crate::logging::LogEmoji;
use crate::pool::PoolReference;

/// Fields of one `Permit(owner,spender,value,nonce,deadline)` message and its domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermitMessage {
    /// Domain name; the LP token's `name()`
    pub domain_name: String,
    pub chain_id: U256,
    /// LP token contract
    pub verifying_contract: Address,
    pub owner: Address,
    pub spender: Address,
    pub value: U256,
    pub nonce: U256,
    /// Unix seconds
    pub deadline: U256,
}

impl PermitMessage {
    pub fn typed_data(&self) -> Result<TypedData> {
        let payload = json!({
            "types": {
                "EIP712Domain": [
                    { "name": "name", "type": "string" },
                    { "name": "version", "type": "string" },
                    { "name": "chainId", "type": "uint256" },
                    { "name": "verifyingContract", "type": "address" }
                ],
                "Permit": [
                    { "name": "owner", "type": "address" },
                    { "name": "spender", "type": "address" },
                    { "name": "value", "type": "uint256" },
                    { "name": "nonce", "type": "uint256" },
                    { "name": "deadline", "type": "uint256" }
                ]
            },
            "primaryType": "Permit",
            "domain": {
                "name": self.domain_name,
                "version": "1",
                "chainId": self.chain_id.to_string(),
                "verifyingContract": self.verifying_contract
            },
            "message": {
                "owner": self.owner,
                "spender": self.spender,
                "value": self.value.to_string(),
                "nonce": self.nonce.to_string(),
                "deadline": self.deadline.to_string()
            }
        });

        serde_json::from_value(payload).map_err(|e| CycleError::TypedData(e.to_string()))
    }

    /// EIP-712 signing hash
    pub fn digest(&self) -> Result<H256> {
        let hash = self
            .typed_data()?
            .encode_eip712()
            .map_err(|e| CycleError::TypedData(e.to_string()))?;
        Ok(H256::from(hash))
    }
}

/// A verified permit, consumed by exactly one withdrawal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPermit {
    pub value: U256,
    pub deadline: U256,
    pub signature: Signature,
}

impl SignedPermit {
    pub fn into_params(self) -> PermitParams {
        PermitParams {
            approve_amount: self.value,
            deadline: self.deadline,
            signature: Bytes::from(self.signature.to_vec()),
        }
    }
}

/// Recover the signer of `digest` and require it to be `expected`
pub fn verify_signature(digest: H256, signature: &Signature, expected: Address) -> Result<()> {
    match signature.recover(digest) {
        Ok(recovered) if recovered == expected => Ok(()),
        Ok(recovered) => Err(CycleError::InvalidSignature {
            expected,
            recovered: Some(recovered),
        }),
        Err(_) => Err(CycleError::InvalidSignature {
            expected,
            recovered: None,
        }),
    }
}

fn unix_now() -> Result<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| CycleError::TypedData(format!("System clock before unix epoch: {e}")))
}

fn permit_deadline() -> Result<U256> {
    Ok(U256::from(unix_now()? + PERMIT_VALIDITY_SECS))
}

/// Build, sign and verify a permit letting the router spend `value` LP tokens
///
/// The nonce and domain name are read fresh from the LP token on every call.
pub async fn authorize<C: ChainClient + ?Sized>(
    client: &C,
    pool: &PoolReference,
    value: U256,
) -> Result<SignedPermit> {
    let owner = client.address();
    let (domain_name, nonce, chain_id) = tokio::try_join!(
        pool.token_name(client),
        pool.permit_nonce(client, owner),
        async { client.chain_id().await.map_err(CycleError::from) },
    )?;

    let message = PermitMessage {
        domain_name,
        chain_id,
        verifying_contract: pool.pool,
        owner,
        spender: pool.router,
        value,
        nonce,
        deadline: permit_deadline()?,
    };
    debug!("Permit message: {:?}", message);

    let typed_data = message.typed_data()?;
    let signature = client.sign_typed_data(&typed_data).await?;
    verify_signature(message.digest()?, &signature, owner)?;

    info!(
        "{} Permit signed for {} LP (nonce {}, deadline {})",
        LogEmoji::SIGN,
        value,
        nonce,
        message.deadline
    );
    Ok(SignedPermit {
        value,
        deadline: message.deadline,
        signature,
    })
}
