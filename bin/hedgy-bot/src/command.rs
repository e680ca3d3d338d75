//! Chat commands and inline-button payloads, decoded once at the edge.
//!
//! Whatever needs the sender's wallet sits in its own enum, so the router checks for
//! a wallet once and then matches exhaustively.

use std::fmt;

use utils::units::is_positive_decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Status,
    Help,
    Buy,
    Sell,
    Wallet(WalletCommand),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletCommand {
    Balance,
    Faucet,
    Show,
    Export,
    HbarFaucet,
    Send,
}

impl From<WalletCommand> for Command {
    fn from(command: WalletCommand) -> Self {
        Command::Wallet(command)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    NotACommand,
    Unknown(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::NotACommand => write!(f, "not a command"),
            CommandError::Unknown(name) => write!(f, "unknown command /{name}"),
        }
    }
}

impl std::error::Error for CommandError {}

impl Command {
    /// Parses the leading `/command` (optionally `/command@botname`) of a message.
    pub fn parse(text: &str) -> Result<Self, CommandError> {
        let head = text.split_whitespace().next().unwrap_or_default();
        let Some(name) = head.strip_prefix('/') else {
            return Err(CommandError::NotACommand);
        };
        let name = name.split_once('@').map(|(n, _)| n).unwrap_or(name);

        Ok(match name {
            "start" => Command::Start,
            "status" => Command::Status,
            "help" => Command::Help,
            "buy" => Command::Buy,
            "sell" => Command::Sell,
            "balance" => WalletCommand::Balance.into(),
            "faucet" => WalletCommand::Faucet.into(),
            "wallet" => WalletCommand::Show.into(),
            "export" => WalletCommand::Export.into(),
            "hbarfaucet" => WalletCommand::HbarFaucet.into(),
            "send" => WalletCommand::Send.into(),
            other => return Err(CommandError::Unknown(other.to_string())),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callback {
    Menu,
    BuyMenu,
    SellMenu,
    Help,
    SendToken,
    SendNative,
    Wallet(WalletCallback),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletCallback {
    Balance,
    Faucet,
    Show,
    ExportKey,
    ConfirmExport,
    HbarFaucet,
    SendMenu,
    /// Spend this many HBAR.
    Buy(String),
    /// Sell this many tokens.
    Sell(String),
}

impl From<WalletCallback> for Callback {
    fn from(callback: WalletCallback) -> Self {
        Callback::Wallet(callback)
    }
}

impl Callback {
    pub fn decode(data: &str) -> Option<Self> {
        let callback = match data {
            "menu" => Callback::Menu,
            "buy" => Callback::BuyMenu,
            "sell" => Callback::SellMenu,
            "help" => Callback::Help,
            "send_hedgy" => Callback::SendToken,
            "send_hbar" => Callback::SendNative,
            "balance" => WalletCallback::Balance.into(),
            "faucet" => WalletCallback::Faucet.into(),
            "wallet" => WalletCallback::Show.into(),
            "export_key" => WalletCallback::ExportKey.into(),
            "confirm_export" => WalletCallback::ConfirmExport.into(),
            "hbar_faucet" => WalletCallback::HbarFaucet.into(),
            "send" => WalletCallback::SendMenu.into(),
            other => {
                if let Some(amount) = other.strip_prefix("buy_") {
                    is_positive_decimal(amount).then(|| Callback::Wallet(WalletCallback::Buy(amount.to_string())))?
                } else if let Some(amount) = other.strip_prefix("sell_") {
                    is_positive_decimal(amount).then(|| Callback::Wallet(WalletCallback::Sell(amount.to_string())))?
                } else {
                    return None;
                }
            }
        };
        Some(callback)
    }

    pub fn encode(&self) -> String {
        match self {
            Callback::Menu => "menu".to_string(),
            Callback::BuyMenu => "buy".to_string(),
            Callback::SellMenu => "sell".to_string(),
            Callback::Help => "help".to_string(),
            Callback::SendToken => "send_hedgy".to_string(),
            Callback::SendNative => "send_hbar".to_string(),
            Callback::Wallet(callback) => match callback {
                WalletCallback::Balance => "balance".to_string(),
                WalletCallback::Faucet => "faucet".to_string(),
                WalletCallback::Show => "wallet".to_string(),
                WalletCallback::ExportKey => "export_key".to_string(),
                WalletCallback::ConfirmExport => "confirm_export".to_string(),
                WalletCallback::HbarFaucet => "hbar_faucet".to_string(),
                WalletCallback::SendMenu => "send".to_string(),
                WalletCallback::Buy(amount) => format!("buy_{amount}"),
                WalletCallback::Sell(amount) => format!("sell_{amount}"),
            },
        }
    }
}
