use tracing::{debug, info};
use utils::units::{parse_positive_amount, WEIBAR_DECIMALS};

use super::{hbar, read_failed, settle, write_failed, FailureReason, Guards, TxFailure, TxOutcome, TxSuccess, WriteOp};
use crate::wallet::Wallet;

impl Guards {
    /// Spends `amount` HBAR on tokens.
    ///
    /// The amount of tokens is whatever `calculateTokenAmount` quotes; the purchase limits
    /// apply to that quote, not to the HBAR spent.
    pub async fn buy(&self, wallet: &Wallet, amount: &str) -> TxOutcome {
        let user = wallet.user;
        let symbol = self.symbol();

        let value = parse_positive_amount(amount, WEIBAR_DECIMALS).map_err(|_| {
            TxFailure::new(FailureReason::Validation, "❌ Invalid amount!\n\nPlease enter a positive number.")
        })?;

        let balance = self
            .gateway
            .native_balance(wallet.address)
            .await
            .map_err(|e| read_failed("your HBAR balance", e))?;
        if balance < value {
            return Err(TxFailure::new(
                FailureReason::InsufficientBalance,
                format!(
                    "⚠️ Insufficient HBAR!\n\nYou need {amount} HBAR but only have {} HBAR.\n\nUse /hbarfaucet to get more!",
                    hbar(balance)
                ),
            ));
        }

        let quote = self
            .gateway
            .buy_quote(value)
            .await
            .map_err(|e| read_failed("the token quote", e))?;
        let stock = self
            .gateway
            .buy_liquidity()
            .await
            .map_err(|e| read_failed("the buy contract balance", e))?;
        debug!(user, %value, %quote, %stock, "buy quote");

        if stock < quote {
            return Err(TxFailure::new(
                FailureReason::InsufficientLiquidity,
                format!(
                    "❌ Contract doesn't have enough tokens!\n\nContract has: {} {symbol}\nNeeded: {} {symbol}\n\nPlease contact the admin to refill the buy contract.",
                    self.tokens(stock),
                    self.tokens(quote)
                ),
            ));
        }

        let bounds = self
            .gateway
            .buy_bounds()
            .await
            .map_err(|e| read_failed("the purchase limits", e))?;
        if !bounds.contains(quote) {
            let (size, label, limit, edge) = if quote < bounds.min {
                ("small", "Minimum", bounds.min, "least")
            } else {
                ("large", "Maximum", bounds.max, "most")
            };
            let hint = match self.gateway.buy_cost(limit).await {
                Ok(cost) => format!("\n\nTry buying with at {edge} {} HBAR.", hbar(cost)),
                Err(_) => String::new(),
            };
            return Err(TxFailure::new(
                FailureReason::BoundsViolated,
                format!(
                    "⚠️ Purchase amount too {size}!\n\n{label} purchase: {} {symbol}\nYou would receive: {} {symbol}{hint}",
                    self.tokens(limit),
                    self.tokens(quote)
                ),
            ));
        }

        let receipt = self
            .gateway
            .buy_tokens(&wallet.signer, value)
            .await
            .map_err(|e| write_failed(WriteOp::Buy, e))?;
        let receipt = settle(WriteOp::Buy, receipt)?;
        info!(user, tx = %receipt.hash, %value, "tokens bought");

        Ok(TxSuccess {
            tx_hash: receipt.hash,
            amount: self.tokens_fixed(quote, 2),
            recipient: Some(wallet.address),
        })
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::U256;

    use super::*;
    use crate::testkit::{hbar as weibar, tokens, MockWrite, TestBed};

    async fn funded(bed: &TestBed) -> Wallet {
        let wallet = bed.wallet(1).await;
        bed.gateway.fund_native(wallet.address, weibar(100));
        wallet
    }

    #[tokio::test]
    async fn quote_below_minimum_is_rejected_before_writing() {
        let bed = TestBed::new();
        let wallet = funded(&bed).await;
        // 1000 tokens per HBAR, minimum 500 tokens
        bed.gateway.with(|s| s.buy_bounds = (tokens(500), tokens(100_000)));

        let failure = bed.guards().buy(&wallet, "0.1").await.unwrap_err();
        assert_eq!(failure.reason, FailureReason::BoundsViolated);
        assert!(failure.message.contains("Minimum purchase: 500 HEDGY"), "{}", failure.message);
        assert!(failure.message.contains("You would receive: 100 HEDGY"));
        assert!(failure.message.contains("at least 0.5 HBAR"));
        assert!(bed.gateway.writes().is_empty());
    }

    #[tokio::test]
    async fn quote_above_maximum_is_rejected() {
        let bed = TestBed::new();
        let wallet = funded(&bed).await;
        bed.gateway.with(|s| s.buy_bounds = (tokens(1), tokens(5_000)));

        let failure = bed.guards().buy(&wallet, "10").await.unwrap_err();
        assert_eq!(failure.reason, FailureReason::BoundsViolated);
        assert!(failure.message.contains("at most 5 HBAR"), "{}", failure.message);
        assert!(bed.gateway.writes().is_empty());
    }

    #[tokio::test]
    async fn quotes_on_either_bound_are_accepted() {
        let bed = TestBed::new();
        let wallet = funded(&bed).await;
        bed.gateway.with(|s| s.buy_bounds = (tokens(500), tokens(5_000)));

        assert_eq!(bed.guards().buy(&wallet, "0.5").await.unwrap().amount, "500.00");
        assert_eq!(bed.guards().buy(&wallet, "5").await.unwrap().amount, "5000.00");
        assert_eq!(bed.gateway.writes().len(), 2);
    }

    #[tokio::test]
    async fn balance_is_checked_first() {
        let bed = TestBed::new();
        let wallet = bed.wallet(1).await;
        bed.gateway.fund_native(wallet.address, weibar(1));

        let failure = bed.guards().buy(&wallet, "5").await.unwrap_err();
        assert_eq!(failure.reason, FailureReason::InsufficientBalance);
        assert!(failure.message.contains("only have 1 HBAR"));
        assert!(bed.gateway.writes().is_empty());
    }

    #[tokio::test]
    async fn thin_liquidity_is_rejected() {
        let bed = TestBed::new();
        let wallet = funded(&bed).await;
        bed.gateway.with(|s| s.buy_liquidity = tokens(50));

        let failure = bed.guards().buy(&wallet, "1").await.unwrap_err();
        assert_eq!(failure.reason, FailureReason::InsufficientLiquidity);
        assert!(bed.gateway.writes().is_empty());
    }

    #[tokio::test]
    async fn successful_buy_sends_the_value() {
        let bed = TestBed::new();
        let wallet = funded(&bed).await;

        let success = bed.guards().buy(&wallet, "0.5").await.unwrap();
        assert_eq!(success.amount, "500.00");
        assert_eq!(
            bed.gateway.writes(),
            vec![MockWrite::Buy {
                from: wallet.address,
                value: weibar(1) / U256::from(2u64)
            }]
        );
    }

    #[tokio::test]
    async fn malformed_amount_is_a_validation_failure() {
        let bed = TestBed::new();
        let wallet = funded(&bed).await;
        let failure = bed.guards().buy(&wallet, "0").await.unwrap_err();
        assert_eq!(failure.reason, FailureReason::Validation);
    }
}
