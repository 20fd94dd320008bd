// src/amount.rs
use alloy::primitives::{I256, U256};
use std::{cmp::Ordering, fmt};

use crate::error::{Error, Result};

/// Non-negative ledger amount in the smallest unit (wei).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(U256);

/// Running balance during replay. Can dip below zero when history is
/// inconsistent, so it carries a sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SignedAmount(I256);

impl Amount {
    pub const ZERO: Amount = Amount(U256::ZERO);

    /// Parse a base-10 string such as `"1000000000000000000"`.
    pub fn parse_decimal(s: &str) -> Result<Self> {
        let digits = s.trim();
        if digits.is_empty() {
            return Err(Error::invalid_amount(s, "empty string"));
        }
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::invalid_amount(s, "expected decimal digits"));
        }
        U256::from_str_radix(digits, 10)
            .map(Amount)
            .map_err(|e| Error::invalid_amount(s, e.to_string()))
    }

    /// Parse a base-16 string, with or without a `0x` prefix.
    pub fn parse_hex(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if digits.is_empty() {
            return Err(Error::invalid_amount(s, "empty string"));
        }
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::invalid_amount(s, "expected hex digits"));
        }
        U256::from_str_radix(digits, 16)
            .map(Amount)
            .map_err(|e| Error::invalid_amount(s, e.to_string()))
    }

    #[cfg(test)]
    pub(crate) fn from_u256(value: U256) -> Self {
        Amount(value)
    }

    #[cfg(test)]
    pub(crate) fn as_u256(&self) -> U256 {
        self.0
    }

    pub fn add(&self, other: &Amount) -> Result<Amount> {
        self.0
            .checked_add(other.0)
            .map(Amount)
            .ok_or(Error::ArithmeticOverflow)
    }

    /// `self - other`, which may be negative. Replay itself works on
    /// [`SignedAmount`] directly; this is the entry point for callers that
    /// start from two unsigned amounts.
    pub fn subtract(&self, other: &Amount) -> Result<SignedAmount> {
        SignedAmount::from_amount(self)?.sub_amount(other)
    }

    pub fn compare(&self, other: &Amount) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Amount(U256::from(value))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn to_signed(amount: &Amount) -> Result<I256> {
    I256::try_from(amount.0).map_err(|_| Error::ArithmeticOverflow)
}

impl SignedAmount {
    pub fn from_amount(amount: &Amount) -> Result<Self> {
        to_signed(amount).map(SignedAmount)
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    pub fn add_amount(&self, amount: &Amount) -> Result<Self> {
        self.0
            .checked_add(to_signed(amount)?)
            .map(SignedAmount)
            .ok_or(Error::ArithmeticOverflow)
    }

    pub fn sub_amount(&self, amount: &Amount) -> Result<Self> {
        self.0
            .checked_sub(to_signed(amount)?)
            .map(SignedAmount)
            .ok_or(Error::ArithmeticOverflow)
    }

    /// Compare against an unsigned amount without converting it, so amounts
    /// above `I256::MAX` still compare correctly.
    pub fn compare_amount(&self, amount: &Amount) -> Ordering {
        if self.is_negative() {
            Ordering::Less
        } else {
            self.0.into_raw().cmp(&amount.0)
        }
    }
}

impl fmt::Display for SignedAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
