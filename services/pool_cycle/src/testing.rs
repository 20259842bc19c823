//! In-memory chain for exercising the cycle without a node
//!
//! [`MockChainClient`] answers the factory, pool and router reads the
//! orchestrators make, records every submitted call, and applies the effect
//! of approve/deposit/burn once a transaction is "confirmed". Outcomes can be
//! scripted per transaction to drive revert and timeout paths.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use ethers::abi::{decode, encode, ParamType, Token};
use ethers::contract::BaseContract;
use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip712::{Eip712, TypedData};
use ethers::types::{Address, Bytes, Signature, H256, U256};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::chain::{ChainClient, ContractCall, TxOutcome};
use crate::contracts::ContractDescriptors;
use crate::pool::PoolContracts;

/// Well-known throwaway key used by the tests
pub const TEST_PRIVATE_KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

#[derive(Debug)]
struct MockState {
    native_balance: U256,
    fee: U256,
    chain_id: U256,
    block_number: u64,
    pool_address: Address,
    total_supply: U256,
    reserve_native: U256,
    lp_balance: U256,
    allowance: U256,
    permit_nonce: U256,
    lp_name: String,
    lp_minted: Option<U256>,
    fail_balance_reads: bool,
    fail_submissions: bool,
    submitted: Vec<ContractCall>,
    pending: HashMap<H256, ContractCall>,
    outcomes: VecDeque<TxOutcome>,
    pinned_reads: Vec<u64>,
}

pub struct MockChainClient {
    wallet: LocalWallet,
    abi: Arc<ContractDescriptors>,
    factory: Address,
    router: Address,
    token_a: Address,
    token_b: Address,
    state: Mutex<MockState>,
}

impl Default for MockChainClient {
    fn default() -> Self {
        Self::new()
    }
}

fn selector(contract: &BaseContract, name: &str) -> Option<[u8; 4]> {
    contract.abi().function(name).ok().map(|f| f.short_signature())
}

fn words(tokens: &[Token]) -> Bytes {
    encode(tokens).into()
}

impl MockChainClient {
    /// Funded account, a pool for the default pair, and empty reserves
    pub fn new() -> Self {
        let wallet: LocalWallet = TEST_PRIVATE_KEY.parse().expect("valid test key");
        let abi = ContractDescriptors::classic().expect("valid descriptors");

        Self {
            wallet: wallet.with_chain_id(324u64),
            abi: Arc::new(abi),
            factory: Address::repeat_byte(0xfa),
            router: Address::repeat_byte(0x70),
            token_a: Address::repeat_byte(0x0a),
            token_b: Address::repeat_byte(0x0b),
            state: Mutex::new(MockState {
                native_balance: U256::exp10(18),
                fee: U256::from(21_000u64),
                chain_id: U256::from(324u64),
                block_number: 100,
                pool_address: Address::repeat_byte(0x90),
                total_supply: U256::zero(),
                reserve_native: U256::zero(),
                lp_balance: U256::zero(),
                allowance: U256::zero(),
                permit_nonce: U256::zero(),
                lp_name: "Classic LP".to_string(),
                lp_minted: None,
                fail_balance_reads: false,
                fail_submissions: false,
                submitted: Vec::new(),
                pending: HashMap::new(),
                outcomes: VecDeque::new(),
                pinned_reads: Vec::new(),
            }),
        }
    }

    /// Contracts for the mock's pair, ready to resolve
    pub fn pool_contracts(&self) -> PoolContracts {
        PoolContracts {
            factory: self.factory,
            router: self.router,
            token_a: self.token_a,
            token_b: self.token_b,
            abi: self.abi.clone(),
        }
    }

    pub fn pool_address(&self) -> Address {
        self.state.lock().pool_address
    }

    /// Zero makes the factory report "no pool"
    pub fn set_pool_address(&self, pool: Address) {
        self.state.lock().pool_address = pool;
    }

    pub fn set_reserves(&self, total_supply: U256, reserve_native: U256) {
        let mut state = self.state.lock();
        state.total_supply = total_supply;
        state.reserve_native = reserve_native;
    }

    pub fn set_block_number(&self, block: u64) {
        self.state.lock().block_number = block;
    }

    pub fn set_native_balance(&self, balance: U256) {
        self.state.lock().native_balance = balance;
    }

    pub fn set_fee(&self, fee: U256) {
        self.state.lock().fee = fee;
    }

    pub fn set_lp_balance(&self, balance: U256) {
        self.state.lock().lp_balance = balance;
    }

    pub fn lp_balance(&self) -> U256 {
        self.state.lock().lp_balance
    }

    /// LP credited by a confirmed deposit; defaults to the deposit's minimum
    pub fn set_lp_minted(&self, minted: U256) {
        self.state.lock().lp_minted = Some(minted);
    }

    pub fn set_allowance(&self, allowance: U256) {
        self.state.lock().allowance = allowance;
    }

    pub fn allowance(&self) -> U256 {
        self.state.lock().allowance
    }

    pub fn set_permit_nonce(&self, nonce: U256) {
        self.state.lock().permit_nonce = nonce;
    }

    /// Make balance and fee reads fail
    pub fn fail_balance_reads(&self, fail: bool) {
        self.state.lock().fail_balance_reads = fail;
    }

    /// Make every submission fail before broadcast
    pub fn fail_submissions(&self, fail: bool) {
        self.state.lock().fail_submissions = fail;
    }

    /// Outcome for the next awaited transaction; unscripted ones confirm
    pub fn push_outcome(&self, outcome: TxOutcome) {
        self.state.lock().outcomes.push_back(outcome);
    }

    /// Every call submitted so far, in order
    pub fn submitted(&self) -> Vec<ContractCall> {
        self.state.lock().submitted.clone()
    }

    /// Whether any `approve` was submitted
    pub fn approval_submitted(&self) -> bool {
        self.state.lock().submitted.iter().any(|c| c.label == "approve")
    }

    /// Block numbers of reads that were pinned to a block
    pub fn pinned_reads(&self) -> Vec<u64> {
        self.state.lock().pinned_reads.clone()
    }

    fn answer(&self, state: &MockState, to: Address, data: &Bytes) -> Result<Bytes> {
        if data.len() < 4 {
            bail!("call data too short");
        }
        let sel = &data[..4];
        let is = |contract: &BaseContract, name: &str| {
            selector(contract, name).map_or(false, |s| s[..] == *sel)
        };

        if to == self.factory && is(&self.abi.factory, "getPool") {
            return Ok(words(&[Token::Address(state.pool_address)]));
        }
        if to != state.pool_address {
            bail!("no contract at {:?}", to);
        }

        let pool = &self.abi.pool;
        if is(pool, "name") {
            Ok(words(&[Token::String(state.lp_name.clone())]))
        } else if is(pool, "totalSupply") {
            Ok(words(&[Token::Uint(state.total_supply)]))
        } else if is(pool, "balanceOf") {
            Ok(words(&[Token::Uint(state.lp_balance)]))
        } else if is(pool, "allowance") {
            Ok(words(&[Token::Uint(state.allowance)]))
        } else if is(pool, "nonces") {
            Ok(words(&[Token::Uint(state.permit_nonce)]))
        } else if is(pool, "getReserves") {
            Ok(words(&[Token::Uint(U256::exp10(9)), Token::Uint(state.reserve_native)]))
        } else {
            bail!("unsupported pool call {}", ethers::utils::hex::encode(sel))
        }
    }

    fn apply(&self, state: &mut MockState, call: &ContractCall) -> Result<()> {
        let args = data_args(&call.data)?;
        match call.label {
            "approve" => {
                let tokens = decode(&[ParamType::Address, ParamType::Uint(256)], args)?;
                state.allowance = uint_at(&tokens, 1, "amount")?;
            }
            "deposit" => {
                let tokens = input_tokens(&self.abi.router, "addLiquidity2", &call.data)?;
                let min_liquidity = uint_at(&tokens, 3, "minLiquidity")?;
                let minted = state.lp_minted.unwrap_or(min_liquidity);
                state.lp_balance = state.lp_balance.saturating_add(minted);
                state.native_balance = state.native_balance.saturating_sub(call.value);
            }
            "withdraw" => {
                // Both burn variants start with (address pool, uint256 liquidity)
                let tokens = decode(&[ParamType::Address, ParamType::Uint(256)], args)?;
                let liquidity = uint_at(&tokens, 1, "liquidity")?;
                state.lp_balance = state.lp_balance.saturating_sub(liquidity);
                state.allowance = state.allowance.saturating_sub(liquidity);
            }
            other => bail!("unknown call label {other}"),
        }
        Ok(())
    }
}

fn uint_at(tokens: &[Token], index: usize, name: &str) -> Result<U256> {
    tokens
        .get(index)
        .cloned()
        .and_then(Token::into_uint)
        .ok_or_else(|| anyhow!("bad {name}"))
}

fn data_args(data: &Bytes) -> Result<&[u8]> {
    data.get(4..).ok_or_else(|| anyhow!("call data too short"))
}

fn input_tokens(contract: &BaseContract, name: &str, data: &Bytes) -> Result<Vec<Token>> {
    let function = contract.abi().function(name)?;
    Ok(function.decode_input(data_args(data)?)?)
}

#[async_trait]
impl ChainClient for MockChainClient {
    fn address(&self) -> Address {
        self.wallet.address()
    }

    async fn native_balance(&self) -> Result<U256> {
        let state = self.state.lock();
        if state.fail_balance_reads {
            bail!("balance read failed");
        }
        Ok(state.native_balance)
    }

    async fn estimate_fee(&self) -> Result<U256> {
        let state = self.state.lock();
        if state.fail_balance_reads {
            bail!("fee estimate failed");
        }
        Ok(state.fee)
    }

    async fn chain_id(&self) -> Result<U256> {
        Ok(self.state.lock().chain_id)
    }

    async fn block_number(&self) -> Result<u64> {
        Ok(self.state.lock().block_number)
    }

    async fn call(&self, to: Address, data: Bytes, block: Option<u64>) -> Result<Bytes> {
        let mut state = self.state.lock();
        if let Some(block) = block {
            state.pinned_reads.push(block);
        }
        self.answer(&state, to, &data)
    }

    async fn submit(&self, call: ContractCall) -> Result<H256> {
        let mut state = self.state.lock();
        if state.fail_submissions {
            bail!("{} submission rejected", call.label);
        }
        let tx_hash = H256::from_low_u64_be(state.submitted.len() as u64 + 1);
        state.submitted.push(call.clone());
        state.pending.insert(tx_hash, call);
        Ok(tx_hash)
    }

    async fn await_confirmation(&self, tx_hash: H256) -> Result<TxOutcome> {
        let mut state = self.state.lock();
        let call = state
            .pending
            .remove(&tx_hash)
            .ok_or_else(|| anyhow!("unknown transaction {:?}", tx_hash))?;

        state.block_number += 1;
        let outcome = state.outcomes.pop_front().unwrap_or(TxOutcome::Confirmed {
            block_number: state.block_number,
        });
        if outcome.is_confirmed() {
            self.apply(&mut state, &call)?;
        }
        Ok(outcome)
    }

    async fn sign_typed_data(&self, data: &TypedData) -> Result<Signature> {
        let digest = data.encode_eip712()?;
        Ok(self.wallet.sign_hash(H256::from(digest))?)
    }
}
