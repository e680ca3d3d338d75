//! The `<address> <amount>` reply that follows a send prompt.

use std::fmt;

use utils::units::is_positive_decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendInput<'a> {
    pub recipient: &'a str,
    pub amount: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendInputError {
    WrongShape,
    InvalidAmount,
}

impl fmt::Display for SendInputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendInputError::WrongShape => write!(f, "expected `<address> <amount>`"),
            SendInputError::InvalidAmount => write!(f, "amount must be a positive number"),
        }
    }
}

impl std::error::Error for SendInputError {}

/// Exactly two whitespace-separated tokens, the second a positive decimal. The address
/// itself is checked later, after the balance.
pub fn parse(text: &str) -> Result<SendInput<'_>, SendInputError> {
    let mut tokens = text.split_whitespace();
    let (Some(recipient), Some(amount), None) = (tokens.next(), tokens.next(), tokens.next()) else {
        return Err(SendInputError::WrongShape);
    };
    if !is_positive_decimal(amount) {
        return Err(SendInputError::InvalidAmount);
    }
    Ok(SendInput { recipient, amount })
}
