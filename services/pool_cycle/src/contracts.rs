//! Contract interface descriptors for the factory, classic pool and router
//!
//! Human-readable ABIs parsed once into [`BaseContract`]s. Argument order of the
//! router methods is fixed by the deployed contracts and must not change:
//!
//! - `addLiquidity2(pool, inputs, recipientData, minLiquidity, callback, callbackData, staking)`
//! - `burnLiquiditySingle(pool, liquidity, withdrawalData, minAmount, callback, callbackData)`

use ethers::abi::{encode, parse_abi, Token};
use ethers::contract::BaseContract;
use ethers::types::{Address, Bytes, U256};

use crate::chain::ContractCall;
use crate::error::Result;

/// Factory: pool lookup by token pair
pub const FACTORY_ABI: &[&str] =
    &["function getPool(address tokenA, address tokenB) external view returns (address pool)"];

/// Classic pool: LP token (ERC20 + permit nonces) and reserves
pub const POOL_ABI: &[&str] = &[
    "function name() external view returns (string)",
    "function totalSupply() external view returns (uint256)",
    "function balanceOf(address owner) external view returns (uint256)",
    "function allowance(address owner, address spender) external view returns (uint256)",
    "function approve(address spender, uint256 amount) external returns (bool)",
    "function nonces(address owner) external view returns (uint256)",
    "function getReserves() external view returns (uint256 reserve0, uint256 reserve1)",
];

/// Router: single-sided liquidity in and out
pub const ROUTER_ABI: &[&str] = &[
    "struct TokenInput { address token; uint256 amount; bool useVault; }",
    "struct ArrayPermitParams { uint256 approveAmount; uint256 deadline; bytes signature; }",
    "function addLiquidity2(address pool, TokenInput[] inputs, bytes data, uint256 minLiquidity, address callback, bytes callbackData, address staking) external payable returns (uint256 liquidity)",
    "function burnLiquiditySingle(address pool, uint256 liquidity, bytes data, uint256 minAmount, address callback, bytes callbackData) external returns (uint256 amountOut)",
    "function burnLiquiditySingleWithPermit(address pool, uint256 liquidity, bytes data, uint256 minAmount, address callback, bytes callbackData, ArrayPermitParams permit) external returns (uint256 amountOut)",
];

/// Parsed descriptors for the three contracts the cycle touches
#[derive(Debug, Clone)]
pub struct ContractDescriptors {
    pub factory: BaseContract,
    pub pool: BaseContract,
    pub router: BaseContract,
}

/// Router withdrawal-data fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawalData {
    /// Asset the single-sided burn pays out in
    pub token_out: Address,
    pub recipient: Address,
    /// 1 = unwrap to native currency
    pub mode: u8,
}

impl WithdrawalData {
    pub fn encode(&self) -> Bytes {
        encode(&[
            Token::Address(self.token_out),
            Token::Address(self.recipient),
            Token::Uint(U256::from(self.mode)),
        ])
        .into()
    }
}

/// Permit parameters passed to `burnLiquiditySingleWithPermit`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermitParams {
    pub approve_amount: U256,
    pub deadline: U256,
    pub signature: Bytes,
}

impl ContractDescriptors {
    /// Descriptors for the SyncSwap-style classic pool protocol
    pub fn classic() -> Result<Self> {
        Ok(Self {
            factory: parse_abi(FACTORY_ABI)?.into(),
            pool: parse_abi(POOL_ABI)?.into(),
            router: parse_abi(ROUTER_ABI)?.into(),
        })
    }

    /// Router deposit of native currency, sent with `value = amount`
    pub fn deposit_call(
        &self,
        router: Address,
        pool: Address,
        amount: U256,
        recipient: Address,
        min_liquidity: U256,
    ) -> Result<ContractCall> {
        // Zero token address with the native flag set means "native currency"
        let inputs = vec![(Address::zero(), amount, true)];
        let recipient_data: Bytes = encode(&[Token::Address(recipient)]).into();

        let data = self.router.encode(
            "addLiquidity2",
            (
                pool,
                inputs,
                recipient_data,
                min_liquidity,
                Address::zero(),
                Bytes::new(),
                Address::zero(),
            ),
        )?;
        Ok(ContractCall::new("deposit", router, data).with_value(amount))
    }

    /// Router single-sided burn of `liquidity` LP tokens
    pub fn withdraw_call(
        &self,
        router: Address,
        pool: Address,
        liquidity: U256,
        withdrawal: WithdrawalData,
        min_amount: U256,
    ) -> Result<ContractCall> {
        let data = self.router.encode(
            "burnLiquiditySingle",
            (
                pool,
                liquidity,
                withdrawal.encode(),
                min_amount,
                Address::zero(),
                Bytes::new(),
            ),
        )?;
        Ok(ContractCall::new("withdraw", router, data))
    }

    /// Same burn, authorised by an off-chain permit instead of an allowance
    pub fn withdraw_with_permit_call(
        &self,
        router: Address,
        pool: Address,
        liquidity: U256,
        withdrawal: WithdrawalData,
        min_amount: U256,
        permit: PermitParams,
    ) -> Result<ContractCall> {
        let data = self.router.encode(
            "burnLiquiditySingleWithPermit",
            (
                pool,
                liquidity,
                withdrawal.encode(),
                min_amount,
                Address::zero(),
                Bytes::new(),
                (permit.approve_amount, permit.deadline, permit.signature),
            ),
        )?;
        Ok(ContractCall::new("withdraw", router, data))
    }

    /// LP token `approve(spender, amount)`
    pub fn approve_call(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<ContractCall> {
        let data = self.pool.encode("approve", (spender, amount))?;
        Ok(ContractCall::new("approve", token, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type DepositArgs = (
        Address,
        Vec<(Address, U256, bool)>,
        Bytes,
        U256,
        Address,
        Bytes,
        Address,
    );
    type WithdrawArgs = (Address, U256, Bytes, U256, Address, Bytes);

    #[test]
    fn test_classic_descriptors_parse() {
        let abi = ContractDescriptors::classic().unwrap();
        assert!(abi.router.abi().function("addLiquidity2").is_ok());
        assert!(abi.router.abi().function("burnLiquiditySingleWithPermit").is_ok());
    }

    #[test]
    fn test_deposit_call_argument_order() {
        let abi = ContractDescriptors::classic().unwrap();
        let router = Address::repeat_byte(0x01);
        let pool = Address::repeat_byte(0x02);
        let caller = Address::repeat_byte(0x03);

        let call = abi
            .deposit_call(router, pool, U256::from(1_000_000u64), caller, U256::from(245_000u64))
            .unwrap();
        assert_eq!(call.to, router);
        assert_eq!(call.value, U256::from(1_000_000u64));
        assert_eq!(call.label, "deposit");

        let args: DepositArgs = abi.router.decode("addLiquidity2", &call.data).unwrap();
        assert_eq!(args.0, pool);
        assert_eq!(args.1, vec![(Address::zero(), U256::from(1_000_000u64), true)]);
        assert_eq!(args.2.as_ref(), encode(&[Token::Address(caller)]).as_slice());
        assert_eq!(args.3, U256::from(245_000u64));
        assert_eq!(args.4, Address::zero());
        assert!(args.5.is_empty());
        assert_eq!(args.6, Address::zero());
    }

    #[test]
    fn test_withdraw_call_argument_order() {
        let abi = ContractDescriptors::classic().unwrap();
        let router = Address::repeat_byte(0x01);
        let pool = Address::repeat_byte(0x02);
        let withdrawal = WithdrawalData {
            token_out: Address::repeat_byte(0x0a),
            recipient: Address::repeat_byte(0x03),
            mode: 1,
        };

        let call = abi
            .withdraw_call(router, pool, U256::from(245_000u64), withdrawal, U256::from(960_400u64))
            .unwrap();
        assert!(call.value.is_zero());

        let args: WithdrawArgs = abi.router.decode("burnLiquiditySingle", &call.data).unwrap();
        assert_eq!(args.0, pool);
        assert_eq!(args.1, U256::from(245_000u64));
        assert_eq!(args.2, withdrawal.encode());
        assert_eq!(args.3, U256::from(960_400u64));
        assert_eq!(args.4, Address::zero());
        assert!(args.5.is_empty());
    }

    #[test]
    fn test_withdrawal_data_layout() {
        let data = WithdrawalData {
            token_out: Address::repeat_byte(0x0a),
            recipient: Address::repeat_byte(0x0b),
            mode: 1,
        }
        .encode();
        // Three static words: address, address, uint8
        assert_eq!(data.len(), 96);
        assert_eq!(&data[12..32], Address::repeat_byte(0x0a).as_bytes());
        assert_eq!(&data[44..64], Address::repeat_byte(0x0b).as_bytes());
        assert_eq!(data[95], 1);
    }

    #[test]
    fn test_approve_targets_lp_token() {
        let abi = ContractDescriptors::classic().unwrap();
        let token = Address::repeat_byte(0x02);
        let spender = Address::repeat_byte(0x01);
        let call = abi.approve_call(token, spender, U256::from(42u64)).unwrap();
        assert_eq!(call.to, token);

        let (decoded_spender, amount): (Address, U256) =
            abi.pool.decode("approve", &call.data).unwrap();
        assert_eq!(decoded_spender, spender);
        assert_eq!(amount, U256::from(42u64));
    }
}
