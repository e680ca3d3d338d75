//! Read-only pre-checks in front of every write.
//!
//! Each operation runs its checks in a fixed order and stops at the first failure, so a
//! doomed transaction never costs the user gas. Passing the checks does not make the
//! write transactional: the chain can still move between the last read and the send, and
//! the receipt has the final word.

mod buy;
mod faucet;
mod outcome;
mod sell;
mod transfer;

use std::sync::Arc;

use alloy::primitives::U256;
use hedgy_contracts::{classify, ContractGateway, ProviderFault, TxReceiptInfo};
use hedgy_store::UserStore;
use tracing::warn;
use utils::units::{format_amount, format_amount_trimmed, WEIBAR_DECIMALS};

pub use outcome::{FailureReason, TxFailure, TxOutcome, TxSuccess};

use crate::{config::BotSettings, cooldown::Clock};

pub struct Guards {
    gateway: Arc<dyn ContractGateway>,
    store: Arc<dyn UserStore>,
    clock: Arc<dyn Clock>,
    settings: Arc<BotSettings>,
}

impl Guards {
    pub fn new(
        gateway: Arc<dyn ContractGateway>,
        store: Arc<dyn UserStore>,
        clock: Arc<dyn Clock>,
        settings: Arc<BotSettings>,
    ) -> Self {
        Self {
            gateway,
            store,
            clock,
            settings,
        }
    }

    fn symbol(&self) -> &str {
        &self.settings.token_symbol
    }

    fn tokens(&self, value: U256) -> String {
        format_amount_trimmed(value, self.settings.token_decimals)
    }

    fn tokens_fixed(&self, value: U256, precision: u8) -> String {
        format_amount(value, self.settings.token_decimals, precision)
    }
}

fn hbar(value: U256) -> String {
    format_amount_trimmed(value, WEIBAR_DECIMALS)
}

fn hbar_fixed(value: U256, precision: u8) -> String {
    format_amount(value, WEIBAR_DECIMALS, precision)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteOp {
    FaucetClaim,
    Buy,
    Approve,
    Sell,
    TokenTransfer,
    NativeTransfer,
}

impl WriteOp {
    fn name(self) -> &'static str {
        match self {
            WriteOp::FaucetClaim => "faucet claim",
            WriteOp::Buy => "buy",
            WriteOp::Approve => "approve",
            WriteOp::Sell => "sell",
            WriteOp::TokenTransfer => "token transfer",
            WriteOp::NativeTransfer => "native transfer",
        }
    }

    /// Message for a transaction whose receipt came back with status 0.
    fn reverted_message(self) -> &'static str {
        match self {
            WriteOp::FaucetClaim => {
                "❌ Transaction reverted!\n\nPossible reasons:\n• Cooldown period not expired\n• Faucet is empty\n• Contract is paused\n\nPlease try again later."
            }
            WriteOp::Buy => {
                "❌ Transaction reverted!\n\nPossible reasons:\n• Buy contract may not have enough tokens\n• Contract may be paused\n\nPlease contact the admin."
            }
            WriteOp::Approve => "❌ Token approval failed!\n\nPlease try again.",
            WriteOp::Sell => {
                "❌ Transaction reverted!\n\nPossible reasons:\n• Sell contract may not have enough HBAR\n• Contract may be paused\n\nPlease contact the admin."
            }
            WriteOp::TokenTransfer | WriteOp::NativeTransfer => "❌ Transaction reverted! Please try again.",
        }
    }

    /// Message for a send that the provider refused outright.
    fn fault_message(self, fault: ProviderFault) -> &'static str {
        match (self, fault) {
            (WriteOp::FaucetClaim, ProviderFault::Cooldown) => "The cooldown between claims has not elapsed yet.",
            (WriteOp::FaucetClaim, ProviderFault::LiquidityExhausted) => {
                "❌ Faucet is empty!\n\nPlease contact the admin to refill the faucet."
            }
            (WriteOp::FaucetClaim, ProviderFault::Reverted) => {
                "⚠️ Transaction will likely fail!\n\nPossible reasons:\n• Cooldown period not expired\n• Faucet is empty or paused\n\nPlease try again later."
            }
            (WriteOp::Buy, ProviderFault::LiquidityExhausted) => {
                "❌ Buy contract is out of tokens!\n\nPlease contact the admin to refill."
            }
            (WriteOp::Buy, ProviderFault::BoundsViolated) => {
                "⚠️ Purchase amount is outside the allowed range!\n\nTry a different amount."
            }
            (WriteOp::Buy, ProviderFault::InsufficientFunds) => {
                "⚠️ Insufficient HBAR for this purchase + gas fees.\n\nUse /hbarfaucet to get more!"
            }
            (WriteOp::Buy, ProviderFault::Reverted) => {
                "❌ Smart contract rejected the transaction!\n\nPossible reasons:\n• Buy contract is out of tokens\n• Amount is outside min/max limits\n• Contract is paused\n\nPlease contact the contract owner/admin."
            }
            (WriteOp::Sell, ProviderFault::LiquidityExhausted) => {
                "❌ Sell contract is out of HBAR!\n\nPlease contact the admin to refill."
            }
            (WriteOp::Sell, ProviderFault::BoundsViolated) => {
                "⚠️ Sell amount is outside the allowed range!\n\nTry a different amount."
            }
            (WriteOp::Sell | WriteOp::Approve, ProviderFault::Reverted) => {
                "❌ Smart contract rejected the transaction!\n\nPossible reasons:\n• Sell contract may not have enough HBAR\n• Amount is outside min/max limits\n• Contract is paused\n\nPlease contact the admin."
            }
            (WriteOp::NativeTransfer, ProviderFault::InsufficientFunds) => {
                "⚠️ Insufficient HBAR!\n\nYou need more HBAR to cover the amount + gas fees.\n\nUse /hbarfaucet to get test HBAR."
            }
            (_, ProviderFault::InsufficientFunds) => {
                "⚠️ Insufficient HBAR for gas fees!\n\nUse /hbarfaucet to get test HBAR."
            }
            (_, ProviderFault::Transport) => "⚠️ Could not reach the network.\n\nPlease try again in a moment.",
            _ => "❌ Transaction failed! Please try again.",
        }
    }
}

/// A pre-check could not be read at all.
fn read_failed(what: &str, err: eyre::Report) -> TxFailure {
    warn!(error = %format!("{err:#}"), "could not read {what}");
    TxFailure::new(
        FailureReason::Transport,
        format!("⚠️ Could not read {what}.\n\nPlease try again in a moment."),
    )
}

fn write_failed(op: WriteOp, err: eyre::Report) -> TxFailure {
    let fault = classify(&err);
    warn!(op = op.name(), %fault, error = %format!("{err:#}"), "write rejected");
    TxFailure::new(fault.into(), op.fault_message(fault))
}

/// Turns a receipt into success or a revert failure.
fn settle(op: WriteOp, receipt: TxReceiptInfo) -> Result<TxReceiptInfo, TxFailure> {
    if receipt.success {
        Ok(receipt)
    } else {
        warn!(op = op.name(), tx = %receipt.hash, "receipt status 0");
        Err(TxFailure::new(FailureReason::Reverted, op.reverted_message()))
    }
}
