use std::{fmt, path::PathBuf, time::Duration};

use alloy::primitives::{Address, U256};
use clap::Parser;
use hedgy_contracts::ContractAddresses;

pub const NATIVE_SYMBOL: &str = "HBAR";

pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
/// Exported keys are deleted from the chat after this long.
pub const SECRET_MESSAGE_TTL: Duration = Duration::from_secs(60);
/// Long-poll timeout passed to getUpdates, in seconds. Must stay below the
/// 17s request timeout of the default teloxide client.
pub const POLL_TIMEOUT_SECS: u32 = 10;

pub const BUY_AMOUNTS: [&str; 5] = ["0.1", "0.5", "1", "5", "10"];
pub const SELL_AMOUNTS: [&str; 5] = ["10", "50", "100", "500", "1000"];

#[derive(Clone, Debug, Parser)]
pub struct NetworkConfig {
    /// Network name, used for explorer links and log file names.
    #[arg(long, env = "HEDERA_NETWORK", default_value = "testnet")]
    pub network: String,

    #[arg(long, env = "HEDERA_CHAIN_ID", default_value_t = 296)]
    pub chain_id: u64,

    #[arg(long, env = "HEDERA_RPC_URL", default_value = "https://testnet.hashio.io/api")]
    pub rpc_url: String,
}

#[derive(Clone, Debug, Parser)]
pub struct ContractsConfig {
    #[arg(long, env = "TOKEN_CONTRACT", default_value = "0xaD1C4E8FeA4baf773507F3F2Ed4760B5CF600d12")]
    pub token_contract: Address,

    #[arg(long, env = "FAUCET_CONTRACT", default_value = "0xc9a2e4b31312dA41A8E88A970f5C5425cBa5743d")]
    pub faucet_contract: Address,

    #[arg(long, env = "BUY_CONTRACT", default_value = "0x390035f16D46f05E5C036206F43B9d6CdAcfb792")]
    pub buy_contract: Address,

    #[arg(long, env = "SELL_CONTRACT", default_value = "0x2BC357F697dd5bDa0F47f6c8500Fe3a1D7df6C49")]
    pub sell_contract: Address,
}

impl ContractsConfig {
    pub fn addresses(&self) -> ContractAddresses {
        ContractAddresses {
            token: self.token_contract,
            faucet: self.faucet_contract,
            buy: self.buy_contract,
            sell: self.sell_contract,
        }
    }
}

#[derive(Clone, Debug, Parser)]
pub struct TokenConfig {
    #[arg(long, env = "TOKEN_NAME", default_value = "HedgyToken")]
    pub token_name: String,

    #[arg(long, env = "TOKEN_SYMBOL", default_value = "HEDGY")]
    pub token_symbol: String,

    #[arg(long, env = "TOKEN_DECIMALS", default_value_t = 18)]
    pub token_decimals: u8,
}

#[derive(Clone, Debug, Parser)]
pub struct FaucetConfig {
    /// Tokens per claim, in base units.
    #[arg(long, env = "FAUCET_DRIP_AMOUNT", default_value = "100000000000000000000")]
    pub faucet_drip_amount: U256,

    /// Seconds between claims.
    #[arg(long, env = "FAUCET_COOLDOWN", default_value_t = 86_400)]
    pub faucet_cooldown: u64,
}

#[derive(Clone, Debug, Parser)]
pub struct StoreConfig {
    #[arg(long, env = "DB_PATH", default_value = "./data/users.json")]
    pub db_path: PathBuf,

    /// Seconds a "send" prompt stays open.
    #[arg(long, env = "SESSION_TTL", default_value_t = 600)]
    pub session_ttl: u64,
}

#[derive(Clone, Parser)]
pub struct TelegramConfig {
    #[arg(long, env = "TELEGRAM_BOT_TOKEN")]
    pub telegram_bot_token: String,

    /// Chat that receives panic reports.
    #[arg(long, env = "ADMIN_CHAT_ID")]
    pub admin_chat_id: Option<String>,
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("telegram_bot_token", &"[REDACTED]")
            .field("admin_chat_id", &self.admin_chat_id)
            .finish()
    }
}

/// What the router needs to know about the deployment.
#[derive(Debug, Clone)]
pub struct BotSettings {
    pub network: String,
    pub token_name: String,
    pub token_symbol: String,
    pub token_decimals: u8,
    pub drip_amount: U256,
    pub faucet_cooldown: Duration,
    pub version: &'static str,
}

impl BotSettings {
    pub fn new(
        network: &NetworkConfig,
        token: &TokenConfig,
        faucet: &FaucetConfig,
        version: &'static str,
    ) -> Self {
        Self {
            network: network.network.clone(),
            token_name: token.token_name.clone(),
            token_symbol: token.token_symbol.clone(),
            token_decimals: token.token_decimals,
            drip_amount: faucet.faucet_drip_amount,
            faucet_cooldown: Duration::from_secs(faucet.faucet_cooldown),
            version,
        }
    }
}
