//! Shared types for the parsing pipeline.

use std::collections::HashMap;
use std::fmt;

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::error::ParserError;

const WEI_PER_ETHER: u64 = 1_000_000_000_000_000_000;

// ─── Address ─────────────────────────────────────────────────────────────────

/// An account address in canonical (lower-case) form.
///
/// Every constructor normalizes, so two addresses that differ only in letter
/// case compare equal and hash identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the empty address (e.g. the `to` of a contract creation).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Address {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&str> for Address {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ─── Transaction ─────────────────────────────────────────────────────────────

/// A value transfer as seen on chain.
///
/// Addresses are kept exactly as the source reported them; matching
/// normalizes on the fly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    hash: String,
    from: String,
    to: String,
    /// Amount in wei.
    value: U256,
}

impl Transaction {
    /// Build a transaction. `hash` and `from` must be non-empty; `to` may be
    /// empty for contract creation.
    pub fn new(
        hash: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        value: U256,
    ) -> Result<Self, ParserError> {
        let hash = hash.into();
        if hash.is_empty() {
            return Err(ParserError::required("transaction hash"));
        }
        let from = from.into();
        if from.is_empty() {
            return Err(ParserError::required("transaction from"));
        }
        Ok(Self {
            hash,
            from,
            to: to.into(),
            value,
        })
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    /// Transferred amount in wei.
    pub fn value(&self) -> U256 {
        self.value
    }

    /// Transferred amount in ether as an exact decimal string.
    pub fn value_ether(&self) -> String {
        format_ether(self.value)
    }
}

/// Render a wei amount as an exact ether decimal, trailing zeros trimmed.
pub fn format_ether(wei: U256) -> String {
    let (whole, frac) = wei.div_rem(U256::from(WEI_PER_ETHER));
    if frac.is_zero() {
        return whole.to_string();
    }
    let frac = format!("{:0>18}", frac.to_string());
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

// ─── Block ───────────────────────────────────────────────────────────────────

/// A fetched block with its transactions in on-chain order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    hash: String,
    number: u64,
    transactions: Vec<Transaction>,
}

impl Block {
    pub fn new(
        hash: impl Into<String>,
        number: u64,
        transactions: Vec<Transaction>,
    ) -> Result<Self, ParserError> {
        let hash = hash.into();
        if hash.is_empty() {
            return Err(ParserError::required("block hash"));
        }
        Ok(Self {
            hash,
            number,
            transactions,
        })
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }
}

// ─── BlockTag ────────────────────────────────────────────────────────────────

/// Which block to ask the source for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTag {
    /// The current chain head.
    Latest,
    /// A block at an exact height.
    Number(u64),
}

impl fmt::Display for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => write!(f, "latest"),
            Self::Number(n) => write!(f, "#{n}"),
        }
    }
}

/// Matched transactions of one block, grouped by canonical address.
pub type AddressBatch = HashMap<Address, Vec<Transaction>>;

// ─── Tests ────────────────────────────────────────────────────────────────────
