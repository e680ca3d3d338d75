use tracing::{debug, info};
use utils::units::{parse_positive_amount, tinybar_to_weibar};

use super::{
    hbar, hbar_fixed, read_failed, settle, write_failed, FailureReason, Guards, TxFailure, TxOutcome, TxSuccess,
    WriteOp,
};
use crate::wallet::Wallet;

impl Guards {
    /// Sells `amount` tokens: balance, limits, gas, payout against contract HBAR, then
    /// approve, allowance check and `sellTokens`.
    pub async fn sell(&self, wallet: &Wallet, amount: &str) -> TxOutcome {
        let user = wallet.user;
        let symbol = self.symbol();
        let sell_contract = self.gateway.addresses().sell;

        let tokens = parse_positive_amount(amount, self.settings.token_decimals).map_err(|_| {
            TxFailure::new(FailureReason::Validation, "❌ Invalid amount!\n\nPlease enter a positive number.")
        })?;

        let held = self
            .gateway
            .token_balance(wallet.address)
            .await
            .map_err(|e| read_failed("your token balance", e))?;
        if held < tokens {
            return Err(TxFailure::new(
                FailureReason::InsufficientBalance,
                format!(
                    "⚠️ Insufficient {symbol}!\n\nYou need {amount} {symbol} but only have {} {symbol}.\n\nUse /faucet or /buy to get more!",
                    self.tokens_fixed(held, 2)
                ),
            ));
        }

        let bounds = self
            .gateway
            .sell_bounds()
            .await
            .map_err(|e| read_failed("the sell limits", e))?;
        if !bounds.contains(tokens) {
            let (size, label, limit) = if tokens < bounds.min {
                ("small", "Minimum", bounds.min)
            } else {
                ("large", "Maximum", bounds.max)
            };
            return Err(TxFailure::new(
                FailureReason::BoundsViolated,
                format!(
                    "⚠️ Sell amount too {size}!\n\n{label} sell: {} {symbol}\nYou tried to sell: {amount} {symbol}",
                    self.tokens(limit)
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

        let payout = self
            .gateway
            .sell_quote(tokens)
            .await
            .map_err(|e| read_failed("the HBAR quote", e))?;
        let liquidity_tinybar = self
            .gateway
            .sell_liquidity_tinybar()
            .await
            .map_err(|e| read_failed("the sell contract balance", e))?;
        let liquidity = tinybar_to_weibar(liquidity_tinybar);
        debug!(user, %tokens, %payout, %liquidity_tinybar, %liquidity, "sell quote");

        if liquidity < payout {
            return Err(TxFailure::new(
                FailureReason::InsufficientLiquidity,
                format!(
                    "❌ Contract doesn't have enough HBAR!\n\nContract has: {} HBAR\nNeeded: {} HBAR\n\nPlease contact the admin to refill the sell contract at:\n{sell_contract}",
                    hbar(liquidity),
                    hbar(payout)
                ),
            ));
        }

        let approval = self
            .gateway
            .approve(&wallet.signer, sell_contract, tokens)
            .await
            .map_err(|e| write_failed(WriteOp::Approve, e))?;
        settle(WriteOp::Approve, approval)?;

        let allowance = self
            .gateway
            .allowance(wallet.address, sell_contract)
            .await
            .map_err(|e| read_failed("the token allowance", e))?;
        if allowance < tokens {
            return Err(TxFailure::new(
                FailureReason::Reverted,
                "❌ Approval verification failed!\n\nThe allowance was not set correctly. Please try again.",
            ));
        }

        let receipt = self
            .gateway
            .sell_tokens(&wallet.signer, tokens)
            .await
            .map_err(|e| write_failed(WriteOp::Sell, e))?;
        let receipt = settle(WriteOp::Sell, receipt)?;
        info!(user, tx = %receipt.hash, %tokens, "tokens sold");

        Ok(TxSuccess {
            tx_hash: receipt.hash,
            amount: hbar_fixed(payout, 4),
            recipient: Some(wallet.address),
        })
    }
}
