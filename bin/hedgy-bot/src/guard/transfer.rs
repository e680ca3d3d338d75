use alloy::primitives::{Address, U256};
use hedgy_contracts::gas;
use hedgy_store::SendKind;
use tracing::info;
use utils::units::{parse_positive_amount, WEIBAR_DECIMALS};

use super::{hbar, read_failed, settle, write_failed, FailureReason, Guards, TxFailure, TxOutcome, TxSuccess, WriteOp};
use crate::{config::NATIVE_SYMBOL, wallet::Wallet};

/// Upper bound on what a plain HBAR transfer costs in fees.
fn native_transfer_fee() -> U256 {
    U256::from(gas::NATIVE_TRANSFER) * U256::from(gas::NATIVE_TRANSFER_PRICE)
}

impl Guards {
    /// Sends `amount` of HBAR or tokens to `recipient`.
    pub async fn transfer(&self, wallet: &Wallet, kind: SendKind, recipient: &str, amount: &str) -> TxOutcome {
        let user = wallet.user;
        let (decimals, symbol) = match kind {
            SendKind::Native => (WEIBAR_DECIMALS, NATIVE_SYMBOL),
            SendKind::Token => (self.settings.token_decimals, self.symbol()),
        };

        let value = parse_positive_amount(amount, decimals).map_err(|_| {
            TxFailure::new(FailureReason::Validation, "❌ Invalid amount!\n\nPlease enter a positive number.")
        })?;

        match kind {
            SendKind::Native => {
                let balance = self
                    .gateway
                    .native_balance(wallet.address)
                    .await
                    .map_err(|e| read_failed("your HBAR balance", e))?;
                let needed = value.saturating_add(native_transfer_fee());
                if balance < needed {
                    return Err(TxFailure::new(
                        FailureReason::InsufficientBalance,
                        format!(
                            "⚠️ Insufficient HBAR!\n\nYou need {} HBAR (including gas) but only have {} HBAR.",
                            hbar(needed),
                            hbar(balance)
                        ),
                    ));
                }
            }
            SendKind::Token => {
                let held = self
                    .gateway
                    .token_balance(wallet.address)
                    .await
                    .map_err(|e| read_failed("your token balance", e))?;
                if held < value {
                    return Err(TxFailure::new(
                        FailureReason::InsufficientBalance,
                        format!(
                            "⚠️ Insufficient {symbol}!\n\nYou have {} {symbol} but tried to send {amount} {symbol}.",
                            self.tokens_fixed(held, 2)
                        ),
                    ));
                }
                let gas = self
                    .gateway
                    .native_balance(wallet.address)
                    .await
                    .map_err(|e| read_failed("your HBAR balance", e))?;
                if gas.is_zero() {
                    return Err(TxFailure::new(
                        FailureReason::NeedsGas,
                        "⚠️ You need HBAR for gas fees!\n\nUse /hbarfaucet to get test HBAR first.",
                    ));
                }
            }
        }

        let to = recipient.parse::<Address>().map_err(|_| {
            TxFailure::new(
                FailureReason::Validation,
                "❌ Invalid recipient address!\n\nPlease check the address and try again.",
            )
        })?;

        let (op, sent) = match kind {
            SendKind::Native => (
                WriteOp::NativeTransfer,
                self.gateway.transfer_native(&wallet.signer, to, value).await,
            ),
            SendKind::Token => (
                WriteOp::TokenTransfer,
                self.gateway.transfer_token(&wallet.signer, to, value).await,
            ),
        };
        let receipt = sent.map_err(|e| write_failed(op, e))?;
        let receipt = settle(op, receipt)?;
        info!(user, tx = %receipt.hash, %kind, %to, %value, "transfer sent");

        Ok(TxSuccess {
            tx_hash: receipt.hash,
            amount: amount.to_string(),
            recipient: Some(to),
        })
    }
}
