//! Amount parsing and formatting.
//!
//! Hedera exposes HBAR in two accounting units. The JSON-RPC relay reports balances and
//! takes `msg.value` in weibar (18 decimals, like wei), while contracts reading
//! `address(this).balance` see tinybar (8 decimals). Anything coming out of a contract
//! view that reports a raw HBAR balance must go through [`tinybar_to_weibar`] once before
//! it is compared with relay-side amounts.

use alloy::primitives::{
    utils::{parse_units, ParseUnits},
    U256,
};
use eyre::{bail, eyre, Result};

pub const TINYBAR_DECIMALS: u8 = 8;
pub const WEIBAR_DECIMALS: u8 = 18;

/// 10^(18 - 8).
pub const WEIBAR_PER_TINYBAR: U256 = U256::from_limbs([10_000_000_000, 0, 0, 0]);

/// Converts a contract-reported tinybar amount to weibar.
pub fn tinybar_to_weibar(tinybar: U256) -> U256 {
    tinybar.saturating_mul(WEIBAR_PER_TINYBAR)
}

fn ten_pow(exp: u8) -> U256 {
    U256::from(10u64).pow(U256::from(exp))
}

/// Parses a human decimal string (`"0.5"`, `".5"`, `"100"`) into base units.
///
/// Negative values and values with more fractional digits than `decimals` are rejected.
pub fn parse_amount(input: &str, decimals: u8) -> Result<U256> {
    let trimmed = input.trim();
    let (whole, frac) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    if whole.is_empty() && frac.is_empty() {
        bail!("empty amount");
    }
    // parse_units truncates excess precision silently
    if frac.len() > decimals as usize {
        bail!("amount {trimmed:?} has more than {decimals} decimal places");
    }
    let whole = if whole.is_empty() { "0" } else { whole };
    let normalized = if frac.is_empty() { whole.to_string() } else { format!("{whole}.{frac}") };
    match parse_units(&normalized, decimals).map_err(|e| eyre!("invalid amount {trimmed:?}: {e}"))? {
        ParseUnits::U256(value) => Ok(value),
        ParseUnits::I256(_) => bail!("negative amount {trimmed:?}"),
    }
}

/// Like [`parse_amount`] but zero is an error too.
pub fn parse_positive_amount(input: &str, decimals: u8) -> Result<U256> {
    let value = parse_amount(input, decimals)?;
    if value.is_zero() {
        bail!("amount must be greater than zero");
    }
    Ok(value)
}

/// Checks that `input` is a plain positive decimal number without converting it.
/// Either side of the point may be empty (`".5"`, `"5."`), not both.
///
/// Used where the decimals of the target unit are not known yet.
pub fn is_positive_decimal(input: &str) -> bool {
    let (whole, frac) = input.split_once('.').unwrap_or((input, ""));
    let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    digits(whole) && digits(frac) && whole.bytes().chain(frac.bytes()).any(|b| b != b'0')
}

/// Formats base units with exactly `precision` fractional digits, rounding half up.
pub fn format_amount(value: U256, decimals: u8, precision: u8) -> String {
    let (scaled, digits) = if precision >= decimals {
        (value.saturating_mul(ten_pow(precision - decimals)), precision)
    } else {
        let step = ten_pow(decimals - precision);
        let half = step / U256::from(2u64);
        (value.saturating_add(half) / step, precision)
    };

    if digits == 0 {
        return scaled.to_string();
    }

    let unit = ten_pow(digits);
    let whole = scaled / unit;
    let frac = scaled % unit;
    format!("{whole}.{frac:0>width$}", frac = frac.to_string(), width = digits as usize)
}

/// Formats base units at full precision with trailing zeros removed.
pub fn format_amount_trimmed(value: U256, decimals: u8) -> String {
    let full = format_amount(value, decimals, decimals);
    if !full.contains('.') {
        return full;
    }
    full.trim_end_matches('0').trim_end_matches('.').to_string()
}
