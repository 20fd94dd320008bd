// src/models.rs
use std::{
    fmt,
    hash::{Hash, Hasher},
};

use crate::amount::Amount;
use crate::error::{Error, Result};

pub type BlockHeight = u64;

/// Account or contract identifier. Compared case-insensitively, so
/// `0xABC…` and `0xabc…` are the same account.
#[derive(Debug, Clone)]
pub struct Address(String);

impl Address {
    /// Wrap an upstream identifier as-is.
    pub fn new(s: impl Into<String>) -> Self {
        Address(s.into())
    }

    /// Validate a caller-supplied address.
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidRequest("wallet address is empty".into()));
        }
        Ok(Address(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for Address {}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.0.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which side of the transfer the queried account was on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The account sent value ("Sender").
    Outbound,
    /// The account received value ("Receiver").
    Inbound,
}

impl Direction {
    pub fn from_transaction_type(kind: &str) -> Result<Self> {
        match kind {
            "Sender" => Ok(Direction::Outbound),
            "Receiver" => Ok(Direction::Inbound),
            other => Err(Error::MalformedUpstreamResponse(format!(
                "unknown transaction_type {other:?}"
            ))),
        }
    }
}

/// A native-value transfer touching the queried account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub hash: String,
    pub amount: Amount,
    pub direction: Direction,
    pub block_height: BlockHeight,
    pub block_time: String, // opaque, compared lexicographically
}

/// One historical call to the watched contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interaction {
    pub hash: String,
    pub sender: Address,
    pub block_height: BlockHeight,
    pub success: bool,
}
