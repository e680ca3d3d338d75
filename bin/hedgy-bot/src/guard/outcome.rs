use std::fmt;

use alloy::primitives::{Address, B256};
use hedgy_contracts::ProviderFault;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    MissingWallet,
    Validation,
    NeedsGas,
    InsufficientBalance,
    InsufficientLiquidity,
    Cooldown,
    BoundsViolated,
    Reverted,
    Transport,
}

impl From<ProviderFault> for FailureReason {
    fn from(fault: ProviderFault) -> Self {
        match fault {
            ProviderFault::InsufficientFunds => FailureReason::InsufficientBalance,
            ProviderFault::Cooldown => FailureReason::Cooldown,
            ProviderFault::LiquidityExhausted => FailureReason::InsufficientLiquidity,
            ProviderFault::BoundsViolated => FailureReason::BoundsViolated,
            ProviderFault::Reverted => FailureReason::Reverted,
            ProviderFault::Transport => FailureReason::Transport,
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureReason::MissingWallet => "missing wallet",
            FailureReason::Validation => "validation",
            FailureReason::NeedsGas => "needs gas",
            FailureReason::InsufficientBalance => "insufficient balance",
            FailureReason::InsufficientLiquidity => "insufficient liquidity",
            FailureReason::Cooldown => "cooldown",
            FailureReason::BoundsViolated => "bounds violated",
            FailureReason::Reverted => "reverted",
            FailureReason::Transport => "transport",
        };
        f.write_str(s)
    }
}

/// A confirmed write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxSuccess {
    pub tx_hash: B256,
    /// Display amount, already formatted in the unit the user asked about.
    pub amount: String,
    pub recipient: Option<Address>,
}

/// A rejected or failed write. `message` is plain text meant for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxFailure {
    pub reason: FailureReason,
    pub message: String,
}

impl TxFailure {
    pub fn new(reason: FailureReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
        }
    }
}

impl fmt::Display for TxFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.reason, self.message)
    }
}

impl std::error::Error for TxFailure {}

pub type TxOutcome = Result<TxSuccess, TxFailure>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_faults_map_onto_reasons() {
        assert_eq!(
            FailureReason::from(ProviderFault::InsufficientFunds),
            FailureReason::InsufficientBalance
        );
        assert_eq!(
            FailureReason::from(ProviderFault::LiquidityExhausted),
            FailureReason::InsufficientLiquidity
        );
        assert_eq!(FailureReason::from(ProviderFault::Transport), FailureReason::Transport);
    }
}
