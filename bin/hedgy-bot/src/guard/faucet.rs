use tracing::{debug, info, warn};

use super::{read_failed, settle, write_failed, FailureReason, Guards, TxFailure, TxOutcome, TxSuccess, WriteOp};
use crate::{cooldown, wallet::Wallet};

fn cooldown_failure(remaining_secs: u64) -> TxFailure {
    let status = cooldown::CooldownStatus {
        eligible: false,
        remaining_secs,
    };
    let (hours, minutes) = status.remaining_hm();
    TxFailure::new(
        FailureReason::Cooldown,
        format!("You can claim again in {hours}h {minutes}m."),
    )
}

impl Guards {
    /// Gas, local cooldown, contract cooldown, faucet stock, then `requestTokens()`.
    ///
    /// The contract-side checks are advisory: if they cannot be read the claim goes ahead
    /// and the contract decides.
    pub async fn claim_faucet(&self, wallet: &Wallet) -> TxOutcome {
        let user = wallet.user;

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

        let local = cooldown::status(wallet.last_claim, self.settings.faucet_cooldown, self.clock.now());
        if !local.eligible {
            debug!(user, remaining = local.remaining_secs, "local cooldown active");
            return Err(cooldown_failure(local.remaining_secs));
        }

        match self.gateway.faucet_can_request(wallet.address).await {
            Ok(true) => {}
            Ok(false) => {
                let remaining = match self.gateway.faucet_time_until_next_drip(wallet.address).await {
                    Ok(secs) => secs,
                    Err(e) => {
                        warn!(user, error = %e, "timeUntilNextDrip unreadable");
                        self.settings.faucet_cooldown.as_secs()
                    }
                };
                return Err(cooldown_failure(remaining));
            }
            Err(e) => warn!(user, error = %e, "canRequestTokens unreadable, claiming anyway"),
        }

        match (self.gateway.faucet_balance().await, self.gateway.faucet_drip_amount().await) {
            (Ok(stock), Ok(drip)) if stock < drip => {
                return Err(TxFailure::new(
                    FailureReason::InsufficientLiquidity,
                    "❌ Faucet is empty!\n\nPlease contact the admin to refill the faucet.",
                ));
            }
            (Ok(_), Ok(_)) => {}
            (Err(e), _) | (_, Err(e)) => warn!(user, error = %e, "faucet stock unreadable, claiming anyway"),
        }

        let receipt = self
            .gateway
            .request_tokens(&wallet.signer)
            .await
            .map_err(|e| write_failed(WriteOp::FaucetClaim, e))?;
        let receipt = settle(WriteOp::FaucetClaim, receipt)?;

        let now = self.clock.now();
        match self.store.record_claim(user, now).await {
            Ok(true) => {}
            Ok(false) => warn!(user, "claim succeeded for a user without a record"),
            Err(e) => warn!(user, error = %format!("{e:#}"), "could not persist claim time"),
        }
        info!(user, tx = %receipt.hash, "faucet claimed");

        Ok(TxSuccess {
            tx_hash: receipt.hash,
            amount: self.tokens(self.settings.drip_amount),
            recipient: Some(wallet.address),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use alloy::primitives::U256;

    use super::*;
    use crate::testkit::{self, hbar, tokens, MockWrite, TestBed};

    #[tokio::test]
    async fn zero_gas_stops_before_any_write() {
        let bed = TestBed::new();
        let wallet = bed.wallet(1).await;

        let failure = bed.guards().claim_faucet(&wallet).await.unwrap_err();
        assert_eq!(failure.reason, FailureReason::NeedsGas);
        assert!(bed.gateway.writes().is_empty());
    }

    #[tokio::test]
    async fn local_cooldown_reports_remaining_time() {
        let bed = TestBed::new();
        let wallet = bed.wallet(1).await;
        bed.gateway.fund_native(wallet.address, hbar(5));
        bed.store_claim(1, bed.clock.now()).await;
        bed.clock.advance(Duration::from_secs(3_600 + 120));

        let failure = bed.guards().claim_faucet(&bed.wallet(1).await).await.unwrap_err();
        assert_eq!(failure.reason, FailureReason::Cooldown);
        assert!(failure.message.contains("22h 58m"), "{}", failure.message);
        assert!(bed.gateway.writes().is_empty());
    }

    #[tokio::test]
    async fn contract_cooldown_is_checked_after_local() {
        let bed = TestBed::new();
        let wallet = bed.wallet(1).await;
        bed.gateway.fund_native(wallet.address, hbar(5));
        bed.gateway.with(|s| {
            s.can_request = Some(false);
            s.time_until_next_drip = 90 * 60;
        });

        let failure = bed.guards().claim_faucet(&wallet).await.unwrap_err();
        assert_eq!(failure.reason, FailureReason::Cooldown);
        assert!(failure.message.contains("1h 30m"));
        assert!(bed.gateway.writes().is_empty());
    }

    #[tokio::test]
    async fn empty_faucet_is_rejected() {
        let bed = TestBed::new();
        let wallet = bed.wallet(1).await;
        bed.gateway.fund_native(wallet.address, hbar(5));
        bed.gateway.with(|s| s.faucet_balance = Some(tokens(10)));

        let failure = bed.guards().claim_faucet(&wallet).await.unwrap_err();
        assert_eq!(failure.reason, FailureReason::InsufficientLiquidity);
        assert!(bed.gateway.writes().is_empty());
    }

    #[tokio::test]
    async fn unreadable_advisory_checks_do_not_block() {
        let bed = TestBed::new();
        let wallet = bed.wallet(1).await;
        bed.gateway.fund_native(wallet.address, hbar(5));
        bed.gateway.with(|s| {
            s.can_request = None;
            s.faucet_balance = None;
        });

        let success = bed.guards().claim_faucet(&wallet).await.unwrap();
        assert_eq!(success.amount, "100");
        assert_eq!(bed.gateway.writes(), vec![MockWrite::Claim(wallet.address)]);
    }

    #[tokio::test]
    async fn success_records_claim_time() {
        let bed = TestBed::new();
        let wallet = bed.wallet(1).await;
        bed.gateway.fund_native(wallet.address, hbar(5));

        let success = bed.guards().claim_faucet(&wallet).await.unwrap();
        assert_eq!(success.recipient, Some(wallet.address));
        assert_eq!(bed.last_claim(1), Some(bed.clock.now()));
        assert_eq!(bed.gateway.token_balance_of(wallet.address), testkit::DRIP);
    }

    #[tokio::test]
    async fn reverted_claim_keeps_old_claim_time() {
        let bed = TestBed::new();
        let wallet = bed.wallet(1).await;
        bed.gateway.fund_native(wallet.address, hbar(5));
        bed.gateway.with(|s| s.revert_writes = true);

        let failure = bed.guards().claim_faucet(&wallet).await.unwrap_err();
        assert_eq!(failure.reason, FailureReason::Reverted);
        assert_eq!(bed.last_claim(1), None);
    }

    #[tokio::test]
    async fn refused_send_is_classified() {
        let bed = TestBed::new();
        let wallet = bed.wallet(1).await;
        bed.gateway.fund_native(wallet.address, hbar(5));
        bed.gateway
            .with(|s| s.fail_next_write = Some("execution reverted: Cooldown period not elapsed".to_string()));

        let failure = bed.guards().claim_faucet(&wallet).await.unwrap_err();
        assert_eq!(failure.reason, FailureReason::Cooldown);
        assert_eq!(bed.gateway.token_balance_of(wallet.address), U256::ZERO);
    }
}
