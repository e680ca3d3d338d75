use std::fmt;

/// What went wrong with a provider call, as far as the error text tells.
///
/// Relays and nodes disagree on error shapes, so this is string matching on the rendered
/// error chain. The contracts' own `require` messages are matched first since they are
/// the most specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderFault {
    InsufficientFunds,
    Cooldown,
    LiquidityExhausted,
    BoundsViolated,
    Reverted,
    Transport,
}

impl fmt::Display for ProviderFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProviderFault::InsufficientFunds => "insufficient funds",
            ProviderFault::Cooldown => "cooldown",
            ProviderFault::LiquidityExhausted => "liquidity exhausted",
            ProviderFault::BoundsViolated => "bounds violated",
            ProviderFault::Reverted => "reverted",
            ProviderFault::Transport => "transport",
        };
        f.write_str(s)
    }
}

const MARKERS: &[(&str, ProviderFault)] = &[
    ("cooldown period not elapsed", ProviderFault::Cooldown),
    ("faucet is empty", ProviderFault::LiquidityExhausted),
    ("insufficient tokens in contract", ProviderFault::LiquidityExhausted),
    ("insufficient hbar in contract", ProviderFault::LiquidityExhausted),
    ("below minimum", ProviderFault::BoundsViolated),
    ("exceeds maximum", ProviderFault::BoundsViolated),
    ("insufficient funds", ProviderFault::InsufficientFunds),
    ("insufficient_payer_balance", ProviderFault::InsufficientFunds),
    ("insufficient balance", ProviderFault::InsufficientFunds),
    ("execution reverted", ProviderFault::Reverted),
    ("contract_revert_executed", ProviderFault::Reverted),
    ("cannot estimate gas", ProviderFault::Reverted),
    ("revert", ProviderFault::Reverted),
];

pub fn classify(err: &eyre::Report) -> ProviderFault {
    classify_text(&format!("{err:#}"))
}

pub fn classify_text(text: &str) -> ProviderFault {
    let lower = text.to_lowercase();
    MARKERS
        .iter()
        .find(|(marker, _)| lower.contains(marker))
        .map(|(_, fault)| *fault)
        .unwrap_or(ProviderFault::Transport)
}
