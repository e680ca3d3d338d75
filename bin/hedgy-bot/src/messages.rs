//! Reply texts, rendered as MarkdownV2. Everything interpolated is escaped here, so
//! callers pass plain text.

use alloy::primitives::{Address, B256};
use hedgy_store::SendKind;
use teloxide::utils::markdown::{bold, code_inline, escape, link};
use utils::link::{short_address, short_tx_hash, HBAR_FAUCET_URL};

use crate::config::NATIVE_SYMBOL;

const EXAMPLE_ADDRESS: &str = "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb";

fn title(emoji: &str, text: &str) -> String {
    format!("{emoji} {}", bold(&escape(text)))
}

pub fn no_wallet() -> String {
    escape("❌ No wallet found. Use /start to create one.")
}

pub fn apology() -> String {
    escape("❌ An error occurred. Please try again.")
}

pub fn invalid_action() -> String {
    escape("❌ Invalid action. Please use the menu buttons.")
}

pub fn welcome(address: &Address, created: bool) -> String {
    let address = code_inline(&address.to_checksum(None));
    if created {
        format!(
            "{}\n\n{}\n\n🔑 {}\n{address}\n\n⚠️ {} {}\n\n{}",
            title("🦔", "Welcome to HedgyBot!"),
            escape("I've created a new wallet for you on Hedera Testnet!"),
            bold("Your Wallet:"),
            bold("Important:"),
            escape("This is a testnet wallet. Use /export to backup your private key!"),
            escape("Choose an option below to get started:"),
        )
    } else {
        format!(
            "{}\n\n👛 {}\n{address}\n\n{}",
            title("🦔", "Welcome back to HedgyBot!"),
            bold("Your Wallet:"),
            escape("Choose an option below:"),
        )
    }
}

pub fn main_menu() -> String {
    format!("{}\n\n{}", title("🦔", "HedgyBot Main Menu"), escape("Select an option:"))
}

/// Short heading sent under the exported key.
pub fn menu_heading() -> String {
    title("🦔", "Main Menu")
}

pub fn fetching_balances() -> String {
    escape("⏳ Fetching balances...")
}

pub fn balances(symbol: &str, tokens: &str, native: &str, address: &Address) -> String {
    format!(
        "{}\n\n🦔 {}\n💎 {}\n\n👛 Wallet: {}",
        title("💰", "Your Balances"),
        escape(&format!("{symbol}: {tokens}")),
        escape(&format!("{NATIVE_SYMBOL}: {native}")),
        code_inline(&short_address(address)),
    )
}

pub fn balance_failed() -> String {
    escape("❌ Error fetching balance. Please try again.")
}

pub fn claiming_faucet() -> String {
    escape("💧 Claiming from faucet...")
}

/// `period` is the claim interval in words, e.g. "24 hours".
pub fn faucet_success(amount: &str, symbol: &str, tx: &B256, period: &str) -> String {
    format!(
        "{}\n\n{}\n\n📝 Transaction: {}\n\n{}",
        title("✅", "Faucet Claimed Successfully!"),
        escape(&format!("You received: {amount} {symbol}")),
        code_inline(&short_tx_hash(tx)),
        escape(&format!("Come back in {period} for more!")),
    )
}

pub fn faucet_cooldown(reason: &str, drip: &str, symbol: &str, period: &str) -> String {
    format!(
        "{}\n\n{}\n\n{}",
        title("⏰", "Faucet Cooldown"),
        escape(reason),
        escape(&format!("The faucet drips {drip} {symbol} every {period}.")),
    )
}

pub fn faucet_failed(reason: &str) -> String {
    format!("{}\n\n{}", title("❌", "Faucet Claim Failed"), escape(reason))
}

pub fn wallet(address: &Address, explorer_url: &str) -> String {
    format!(
        "{}\n\nAddress:\n{}\n\n🔍 {}\n\n{}",
        title("👛", "Your Wallet"),
        code_inline(&address.to_checksum(None)),
        link(explorer_url, "View on Explorer"),
        escape("⚠️ Use /export to backup your private key!"),
    )
}

pub fn export_warning() -> String {
    format!(
        "{}\n\n{}\n\n{}\n\n{}\n\n{}",
        title("⚠️", "SECURITY WARNING"),
        escape("You are about to export your private key."),
        bold(&escape("Never share your private key with anyone!")),
        escape("Anyone with your private key has full access to your wallet and funds."),
        escape("Are you sure you want to continue?"),
    )
}

pub fn private_key(secret: &str) -> String {
    format!(
        "{}\n\n{}\n\n⚠️ {}\n{}\n\n{}",
        title("🔑", "Your Private Key"),
        code_inline(secret),
        bold("IMPORTANT:"),
        escape("• Save this somewhere safe\n• Never share it with anyone\n• Delete this message after saving"),
        escape("This message will self-destruct in 60 seconds."),
    )
}

pub fn hbar_faucet(address: &Address, symbol: &str) -> String {
    format!(
        "{}\n\n{}\n🔗 {}\n\n{}\n{}\n\n📋 {}\n{}\n\n{}",
        title("🌊", "Get Test HBAR"),
        escape("To get test HBAR for transactions, visit:"),
        link(HBAR_FAUCET_URL, "Hedera Testnet Faucet"),
        escape("Your wallet address:"),
        code_inline(&address.to_checksum(None)),
        bold("Instructions:"),
        escape(
            "1. Click the link above\n2. Paste your wallet address\n3. Complete the captcha\n4. Receive 10,000 test HBAR!"
        ),
        escape(&format!(
            "You'll need HBAR for gas fees to use the {symbol} faucet and trade tokens."
        )),
    )
}

pub fn help(symbol: &str) -> String {
    let commands = format!(
        "/start - Create wallet & show menu\n\
         /balance - Check your balances\n\
         /faucet - Get free {symbol} tokens\n\
         /buy - Buy {symbol} with HBAR\n\
         /sell - Sell {symbol} for HBAR\n\
         /send - Send HBAR or {symbol}\n\
         /wallet - View your wallet\n\
         /export - Export private key\n\
         /hbarfaucet - Get test HBAR\n\
         /status - Check contract status\n\
         /help - Show this message"
    );
    let quick_start = format!(
        "1. Get test HBAR from /hbarfaucet\n2. Claim {symbol} from /faucet\n3. Trade using /buy or /sell"
    );
    format!(
        "{}\n\n{}\n\n{}\n\n{}\n{}\n\n{}",
        title("🦔", "HedgyBot Help"),
        bold("Available Commands:"),
        escape(&commands),
        bold("Quick Start:"),
        escape(&quick_start),
        escape("⚠️ This is Hedera Testnet - for testing only!"),
    )
}

/// Contract state shown by `/status`, already formatted for display.
#[derive(Debug, Clone, Default)]
pub struct ContractStatus {
    pub faucet_balance: String,
    pub drip_amount: String,
    pub faucet_period: String,
    pub buy_available: String,
    pub buy_price: String,
    pub buy_min: String,
    pub buy_max: String,
    pub sell_available: String,
    pub sell_price: String,
    pub sell_min: String,
    pub sell_max: String,
}

pub fn status(token_name: &str, symbol: &str, s: &ContractStatus, version: &str) -> String {
    format!(
        "{}\n{}\n\n🚰 {}\n{}\n\n🛒 {}\n{}\n\n💸 {}\n{}\n\n{}\n{}",
        title("📊", "Contract Status"),
        escape(&format!("{token_name} ({symbol})")),
        bold("Faucet Contract:"),
        escape(&format!(
            "Balance: {}\nPer Claim: {}\nCooldown: {}",
            s.faucet_balance, s.drip_amount, s.faucet_period
        )),
        bold("Buy Contract:"),
        escape(&format!(
            "{symbol} Available: {}\nPrice: {} HBAR per token\nMin/Max: {}-{} {symbol}",
            s.buy_available, s.buy_price, s.buy_min, s.buy_max
        )),
        bold("Sell Contract:"),
        escape(&format!(
            "HBAR Available: {}\nPrice: {} HBAR per token\nMin/Max: {}-{} {symbol}",
            s.sell_available, s.sell_price, s.sell_min, s.sell_max
        )),
        escape("✅ All contracts operational!"),
        escape(&format!("v{version}")),
    )
}

pub fn status_failed() -> String {
    escape("❌ Error checking contract status. Please try again.")
}

pub fn buy_menu(symbol: &str) -> String {
    format!(
        "{}\n\n{}",
        title("🛒", &format!("Buy {symbol} Tokens")),
        escape("Select the amount of HBAR you want to spend:"),
    )
}

pub fn sell_menu(symbol: &str) -> String {
    format!(
        "{}\n\n{}",
        title("💸", &format!("Sell {symbol} Tokens")),
        escape(&format!("Select the amount of {symbol} you want to sell:")),
    )
}

pub fn use_menu_to_buy() -> String {
    escape("🛒 Use the menu buttons or type /start to access buying options.")
}

pub fn use_menu_to_sell() -> String {
    escape("💸 Use the menu buttons or type /start to access selling options.")
}

pub fn buy_processing(amount: &str, symbol: &str) -> String {
    escape(&format!("⏳ Processing purchase of {amount} HBAR worth of {symbol}..."))
}

pub fn buy_success(spent: &str, received: &str, symbol: &str, tx: &B256) -> String {
    format!(
        "{}\n\n{}\n📝 Transaction: {}\n\n{}",
        title("✅", "Purchase Successful!"),
        escape(&format!("You spent: {spent} HBAR\nYou received: ~{received} {symbol}")),
        code_inline(&short_tx_hash(tx)),
        escape("Check your balance with /balance"),
    )
}

pub fn buy_failed(reason: &str) -> String {
    format!(
        "{}\n\n{}\n\n{}",
        title("❌", "Purchase Failed"),
        escape(reason),
        escape("Make sure you have enough HBAR!"),
    )
}

pub fn sell_processing(amount: &str, symbol: &str) -> String {
    escape(&format!("⏳ Processing sale of {amount} {symbol}..."))
}

pub fn sell_success(sold: &str, symbol: &str, payout: &str, tx: &B256) -> String {
    format!(
        "{}\n\n{}\n📝 Transaction: {}\n\n{}",
        title("✅", "Sale Successful!"),
        escape(&format!("You sold: {sold} {symbol}\nYou received: ~{payout} HBAR")),
        code_inline(&short_tx_hash(tx)),
        escape("Check your balance with /balance"),
    )
}

pub fn sell_failed(reason: &str, symbol: &str) -> String {
    format!(
        "{}\n\n{}\n\n{}",
        title("❌", "Sale Failed"),
        escape(reason),
        escape(&format!("Make sure you have enough {symbol}!")),
    )
}

pub fn send_menu() -> String {
    format!("{}\n\n{}", title("📤", "Send Tokens"), escape("What would you like to send?"))
}

pub fn send_prompt(kind: SendKind, symbol: &str) -> String {
    let (heading, unit, example) = match kind {
        SendKind::Token => (format!("Send {symbol} Tokens"), symbol, "100"),
        SendKind::Native => (format!("Send {NATIVE_SYMBOL}"), NATIVE_SYMBOL, "10"),
    };
    format!(
        "{}\n\n{}\n{}\n\n{}\n{}\n\n{}",
        title("📤", &heading),
        escape("Please send the details in this format:"),
        code_inline("recipient_address amount"),
        bold("Example:"),
        code_inline(&format!("{EXAMPLE_ADDRESS} {example}")),
        escape(&format!("This will send {example} {unit} to the address.")),
    )
}

pub fn send_format_error() -> String {
    format!(
        "{}\n\n{} {}\n\n{} {}",
        escape("❌ Invalid format!"),
        escape("Please use:"),
        code_inline("address amount"),
        escape("Example:"),
        code_inline("0x742d35...bEb 100"),
    )
}

pub fn invalid_amount() -> String {
    escape("❌ Invalid amount!\n\nPlease enter a positive number.")
}

pub fn send_success(amount: &str, symbol: &str, recipient: &str, tx: &B256, tx_url: &str) -> String {
    format!(
        "{}\n\n{}\n📍 To: {}\n🔗 TX: {}\n\n{}\n{}",
        title("✅", "Send Successful!"),
        escape(&format!("📤 Sent: {amount} {symbol}")),
        code_inline(recipient),
        code_inline(&tx.to_string()),
        escape("View on HashScan:"),
        escape(tx_url),
    )
}

pub fn send_failed(reason: &str) -> String {
    format!("{}\n\n{}", title("❌", "Send Failed"), escape(reason))
}
