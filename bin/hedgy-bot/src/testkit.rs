//! In-memory doubles for router and guard tests.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use alloy::{
    primitives::{Address, Bytes, B256, U256},
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;
use burberry::ActionSubmitter;
use chrono::{DateTime, TimeDelta, Utc};
use eyre::{eyre, Result};
use hedgy_contracts::{AmountBounds, ContractAddresses, ContractGateway, TxReceiptInfo};
use hedgy_store::{MemorySessionStore, MemoryStore, UserId, UserStore};

use crate::{
    config::BotSettings,
    cooldown::Clock,
    guard::Guards,
    router::Router,
    types::Action,
    wallet::{Wallet, Wallets},
};

/// 100 tokens, the configured drip.
pub const DRIP: U256 = U256::from_limbs([7_766_279_631_452_241_920, 5, 0, 0]);

pub fn tokens(n: u64) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
}

/// Whole HBAR in weibar.
pub fn hbar(n: u64) -> U256 {
    tokens(n)
}

pub fn settings() -> BotSettings {
    BotSettings {
        network: "testnet".to_string(),
        token_name: "HedgyToken".to_string(),
        token_symbol: "HEDGY".to_string(),
        token_decimals: 18,
        drip_amount: DRIP,
        faucet_cooldown: Duration::from_secs(86_400),
        version: "test",
    }
}

#[derive(Debug)]
pub struct ManualClock(Mutex<DateTime<Utc>>);

impl Default for ManualClock {
    fn default() -> Self {
        Self(Mutex::new(DateTime::from_timestamp(1_700_000_000, 0).unwrap()))
    }
}

impl ManualClock {
    pub fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }

    pub fn advance(&self, by: Duration) {
        *self.0.lock().unwrap() += TimeDelta::from_std(by).unwrap();
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        ManualClock::now(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockWrite {
    Claim(Address),
    Buy { from: Address, value: U256 },
    Approve { owner: Address, spender: Address, amount: U256 },
    Sell { from: Address, amount: U256 },
    TokenTransfer { from: Address, to: Address, amount: U256 },
    NativeTransfer { from: Address, to: Address, amount: U256 },
}

/// Chain state seen by [`MockGateway`]. `None` on an optional read makes it fail.
#[derive(Debug)]
pub struct MockState {
    pub native: HashMap<Address, U256>,
    pub tokens: HashMap<Address, U256>,
    pub allowances: HashMap<(Address, Address), U256>,
    pub can_request: Option<bool>,
    pub time_until_next_drip: u64,
    pub faucet_cooldown: Option<u64>,
    pub faucet_balance: Option<U256>,
    /// Tokens per whole HBAR on both sides.
    pub buy_rate: u64,
    pub sell_rate: u64,
    pub buy_bounds: (U256, U256),
    pub buy_liquidity: U256,
    pub sell_bounds: (U256, U256),
    pub sell_liquidity_tinybar: U256,
    pub approve_sets_allowance: bool,
    pub revert_writes: bool,
    pub fail_next_write: Option<String>,
    pub writes: Vec<MockWrite>,
    /// Addresses with no bytecode.
    pub undeployed: Vec<Address>,
    nonce: u64,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            native: HashMap::new(),
            tokens: HashMap::new(),
            allowances: HashMap::new(),
            can_request: Some(true),
            time_until_next_drip: 0,
            faucet_cooldown: Some(86_400),
            faucet_balance: Some(tokens(1_000_000)),
            buy_rate: 1_000,
            sell_rate: 100,
            buy_bounds: (tokens(1), tokens(100_000)),
            buy_liquidity: tokens(1_000_000),
            sell_bounds: (tokens(1), tokens(100_000)),
            // 1000 HBAR
            sell_liquidity_tinybar: U256::from(100_000_000_000u64),
            approve_sets_allowance: true,
            revert_writes: false,
            fail_next_write: None,
            writes: Vec::new(),
            undeployed: Vec::new(),
            nonce: 0,
        }
    }
}

pub struct MockGateway {
    addresses: ContractAddresses,
    state: Mutex<MockState>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self {
            addresses: ContractAddresses {
                token: Address::repeat_byte(0x01),
                faucet: Address::repeat_byte(0x02),
                buy: Address::repeat_byte(0x03),
                sell: Address::repeat_byte(0x04),
            },
            state: Mutex::new(MockState::default()),
        }
    }
}

impl MockGateway {
    pub fn with<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn fund_native(&self, owner: Address, amount: U256) {
        self.with(|s| *s.native.entry(owner).or_default() += amount);
    }

    pub fn fund_tokens(&self, owner: Address, amount: U256) {
        self.with(|s| *s.tokens.entry(owner).or_default() += amount);
    }

    pub fn writes(&self) -> Vec<MockWrite> {
        self.with(|s| s.writes.clone())
    }

    pub fn token_balance_of(&self, owner: Address) -> U256 {
        self.with(|s| s.tokens.get(&owner).copied().unwrap_or_default())
    }

    /// Records `write` and applies `effect` unless the state says to fail or revert.
    fn write(&self, write: MockWrite, effect: impl FnOnce(&mut MockState)) -> Result<TxReceiptInfo> {
        self.with(|s| {
            if let Some(reason) = s.fail_next_write.take() {
                return Err(eyre!(reason));
            }
            s.nonce += 1;
            s.writes.push(write);
            let success = !s.revert_writes;
            if success {
                effect(s);
            }
            Ok(TxReceiptInfo {
                hash: B256::with_last_byte(s.nonce as u8),
                success,
                gas_used: 21_000,
                block_number: Some(s.nonce),
            })
        })
    }
}

fn read<T>(value: Option<T>, what: &str) -> Result<T> {
    value.ok_or_else(|| eyre!("{what}: request timed out"))
}

#[async_trait]
impl ContractGateway for MockGateway {
    fn addresses(&self) -> &ContractAddresses {
        &self.addresses
    }

    async fn native_balance(&self, owner: Address) -> Result<U256> {
        Ok(self.with(|s| s.native.get(&owner).copied().unwrap_or_default()))
    }

    async fn token_balance(&self, owner: Address) -> Result<U256> {
        Ok(self.token_balance_of(owner))
    }

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256> {
        Ok(self.with(|s| s.allowances.get(&(owner, spender)).copied().unwrap_or_default()))
    }

    async fn code_at(&self, address: Address) -> Result<Bytes> {
        if self.with(|s| s.undeployed.contains(&address)) {
            return Ok(Bytes::new());
        }
        Ok(Bytes::from_static(&[0x60, 0x80]))
    }

    async fn faucet_can_request(&self, _account: Address) -> Result<bool> {
        read(self.with(|s| s.can_request), "canRequestTokens")
    }

    async fn faucet_time_until_next_drip(&self, _account: Address) -> Result<u64> {
        Ok(self.with(|s| s.time_until_next_drip))
    }

    async fn faucet_drip_amount(&self) -> Result<U256> {
        Ok(DRIP)
    }

    async fn faucet_cooldown(&self) -> Result<u64> {
        read(self.with(|s| s.faucet_cooldown), "cooldownTime")
    }

    async fn faucet_balance(&self) -> Result<U256> {
        read(self.with(|s| s.faucet_balance), "getFaucetBalance")
    }

    async fn buy_quote(&self, native: U256) -> Result<U256> {
        Ok(self.with(|s| native * U256::from(s.buy_rate)))
    }

    async fn buy_cost(&self, tokens: U256) -> Result<U256> {
        Ok(self.with(|s| tokens / U256::from(s.buy_rate)))
    }

    async fn buy_bounds(&self) -> Result<AmountBounds> {
        Ok(self.with(|s| AmountBounds::new(s.buy_bounds.0, s.buy_bounds.1)))
    }

    async fn buy_price(&self) -> Result<U256> {
        Ok(self.with(|s| hbar(1) / U256::from(s.buy_rate)))
    }

    async fn buy_liquidity(&self) -> Result<U256> {
        Ok(self.with(|s| s.buy_liquidity))
    }

    async fn sell_quote(&self, tokens: U256) -> Result<U256> {
        Ok(self.with(|s| tokens / U256::from(s.sell_rate)))
    }

    async fn sell_bounds(&self) -> Result<AmountBounds> {
        Ok(self.with(|s| AmountBounds::new(s.sell_bounds.0, s.sell_bounds.1)))
    }

    async fn sell_price(&self) -> Result<U256> {
        Ok(self.with(|s| hbar(1) / U256::from(s.sell_rate)))
    }

    async fn sell_liquidity_tinybar(&self) -> Result<U256> {
        Ok(self.with(|s| s.sell_liquidity_tinybar))
    }

    async fn request_tokens(&self, signer: &PrivateKeySigner) -> Result<TxReceiptInfo> {
        let owner = signer.address();
        self.write(MockWrite::Claim(owner), |s| *s.tokens.entry(owner).or_default() += DRIP)
    }

    async fn buy_tokens(&self, signer: &PrivateKeySigner, value: U256) -> Result<TxReceiptInfo> {
        let from = signer.address();
        self.write(MockWrite::Buy { from, value }, |s| {
            let bought = value * U256::from(s.buy_rate);
            *s.tokens.entry(from).or_default() += bought;
            let native = s.native.entry(from).or_default();
            *native = native.saturating_sub(value);
        })
    }

    async fn approve(&self, signer: &PrivateKeySigner, spender: Address, amount: U256) -> Result<TxReceiptInfo> {
        let owner = signer.address();
        self.write(MockWrite::Approve { owner, spender, amount }, |s| {
            if s.approve_sets_allowance {
                s.allowances.insert((owner, spender), amount);
            }
        })
    }

    async fn sell_tokens(&self, signer: &PrivateKeySigner, amount: U256) -> Result<TxReceiptInfo> {
        let from = signer.address();
        self.write(MockWrite::Sell { from, amount }, |s| {
            let held = s.tokens.entry(from).or_default();
            *held = held.saturating_sub(amount);
            let payout = amount / U256::from(s.sell_rate);
            *s.native.entry(from).or_default() += payout;
        })
    }

    async fn transfer_token(&self, signer: &PrivateKeySigner, to: Address, amount: U256) -> Result<TxReceiptInfo> {
        let from = signer.address();
        self.write(MockWrite::TokenTransfer { from, to, amount }, |s| {
            let held = s.tokens.entry(from).or_default();
            *held = held.saturating_sub(amount);
            *s.tokens.entry(to).or_default() += amount;
        })
    }

    async fn transfer_native(&self, signer: &PrivateKeySigner, to: Address, amount: U256) -> Result<TxReceiptInfo> {
        let from = signer.address();
        self.write(MockWrite::NativeTransfer { from, to, amount }, |s| {
            let held = s.native.entry(from).or_default();
            *held = held.saturating_sub(amount);
            *s.native.entry(to).or_default() += amount;
        })
    }
}

/// Collects submitted actions in order.
#[derive(Default)]
pub struct RecordingSubmitter(Mutex<Vec<Action>>);

impl RecordingSubmitter {
    pub fn take(&self) -> Vec<Action> {
        std::mem::take(&mut self.0.lock().unwrap())
    }
}

impl ActionSubmitter<Action> for RecordingSubmitter {
    fn submit(&self, action: Action) {
        self.0.lock().unwrap().push(action);
    }
}

pub struct TestBed {
    pub gateway: Arc<MockGateway>,
    pub store: Arc<MemoryStore>,
    pub sessions: Arc<MemorySessionStore>,
    pub clock: Arc<ManualClock>,
    pub settings: Arc<BotSettings>,
}

impl TestBed {
    pub fn new() -> Self {
        Self {
            gateway: Arc::new(MockGateway::default()),
            store: Arc::new(MemoryStore::new()),
            sessions: Arc::new(MemorySessionStore::default()),
            clock: Arc::new(ManualClock::default()),
            settings: Arc::new(settings()),
        }
    }

    pub fn wallets(&self) -> Wallets {
        Wallets::new(self.store.clone(), self.clock.clone())
    }

    /// Provisions (or loads) the wallet for `user`.
    pub async fn wallet(&self, user: UserId) -> Wallet {
        self.wallets().get_or_create(user, None).await.unwrap().0
    }

    pub fn guards(&self) -> Guards {
        Guards::new(
            self.gateway.clone(),
            self.store.clone(),
            self.clock.clone(),
            self.settings.clone(),
        )
    }

    pub fn router(&self) -> Router {
        Router::new(
            self.gateway.clone(),
            self.store.clone(),
            self.sessions.clone(),
            self.clock.clone(),
            self.settings.clone(),
        )
    }

    pub async fn store_claim(&self, user: UserId, at: DateTime<Utc>) {
        assert!(self.store.record_claim(user, at).await.unwrap());
    }

    pub fn last_claim(&self, user: UserId) -> Option<DateTime<Utc>> {
        self.store.get(user).unwrap().and_then(|r| r.last_faucet_claim)
    }
}
