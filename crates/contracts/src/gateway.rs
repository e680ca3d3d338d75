use alloy::{
    primitives::{Address, Bytes, B256, U256},
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;
use eyre::Result;

/// Fixed gas ceilings for every write the bot sends.
pub mod gas {
    pub const FAUCET_CLAIM: u64 = 300_000;
    pub const BUY: u64 = 500_000;
    pub const APPROVE: u64 = 200_000;
    pub const SELL: u64 = 1_000_000;
    pub const TOKEN_TRANSFER: u64 = 100_000;
    pub const NATIVE_TRANSFER: u64 = 21_000;
    /// Gas price assumed when reserving fees for a native send, in wei.
    pub const NATIVE_TRANSFER_PRICE: u64 = 430_000_000_000;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractAddresses {
    pub token: Address,
    pub faucet: Address,
    pub buy: Address,
    pub sell: Address,
}

impl ContractAddresses {
    pub fn labelled(&self) -> [(&'static str, Address); 4] {
        [
            ("token", self.token),
            ("faucet", self.faucet),
            ("buy", self.buy),
            ("sell", self.sell),
        ]
    }
}

/// Inclusive limits, in token base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountBounds {
    pub min: U256,
    pub max: U256,
}

impl AmountBounds {
    pub fn new(min: U256, max: U256) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, amount: U256) -> bool {
        self.min <= amount && amount <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxReceiptInfo {
    pub hash: B256,
    pub success: bool,
    pub gas_used: u64,
    pub block_number: Option<u64>,
}

/// Every contract interaction the bot performs.
///
/// Native amounts are in weibar except where a method says tinybar. Writes wait for the
/// receipt and return it whatever its status; errors mean the transaction could not be
/// sent or its receipt could not be fetched.
#[async_trait]
pub trait ContractGateway: Send + Sync {
    fn addresses(&self) -> &ContractAddresses;

    async fn native_balance(&self, owner: Address) -> Result<U256>;
    async fn token_balance(&self, owner: Address) -> Result<U256>;
    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256>;
    async fn code_at(&self, address: Address) -> Result<Bytes>;

    async fn faucet_can_request(&self, account: Address) -> Result<bool>;
    /// Seconds until `account` may claim again.
    async fn faucet_time_until_next_drip(&self, account: Address) -> Result<u64>;
    async fn faucet_drip_amount(&self) -> Result<U256>;
    /// Cooldown in seconds.
    async fn faucet_cooldown(&self) -> Result<u64>;
    async fn faucet_balance(&self) -> Result<U256>;

    /// Tokens received for spending `native` weibar.
    async fn buy_quote(&self, native: U256) -> Result<U256>;
    /// Weibar needed to receive `tokens`.
    async fn buy_cost(&self, tokens: U256) -> Result<U256>;
    async fn buy_bounds(&self) -> Result<AmountBounds>;
    async fn buy_price(&self) -> Result<U256>;
    /// Tokens held by the buy contract.
    async fn buy_liquidity(&self) -> Result<U256>;

    /// Weibar paid out for selling `tokens`.
    async fn sell_quote(&self, tokens: U256) -> Result<U256>;
    async fn sell_bounds(&self) -> Result<AmountBounds>;
    async fn sell_price(&self) -> Result<U256>;
    /// Native balance of the sell contract, as the contract sees it: tinybar.
    async fn sell_liquidity_tinybar(&self) -> Result<U256>;

    async fn request_tokens(&self, signer: &PrivateKeySigner) -> Result<TxReceiptInfo>;
    async fn buy_tokens(&self, signer: &PrivateKeySigner, value: U256) -> Result<TxReceiptInfo>;
    async fn approve(&self, signer: &PrivateKeySigner, spender: Address, amount: U256) -> Result<TxReceiptInfo>;
    async fn sell_tokens(&self, signer: &PrivateKeySigner, amount: U256) -> Result<TxReceiptInfo>;
    async fn transfer_token(&self, signer: &PrivateKeySigner, to: Address, amount: U256) -> Result<TxReceiptInfo>;
    async fn transfer_native(&self, signer: &PrivateKeySigner, to: Address, amount: U256) -> Result<TxReceiptInfo>;
}
