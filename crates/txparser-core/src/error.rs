//! Error types for the txparser pipeline.

use thiserror::Error;

use crate::types::Address;

/// Errors produced by the core and its collaborators.
#[derive(Debug, Error)]
pub enum ParserError {
    /// The block source could not produce a block.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// The transaction store failed to save or read.
    #[error("storage error: {0}")]
    Storage(String),

    /// No transactions have been recorded for the address.
    #[error("no transactions found for address {address}")]
    NotFound { address: Address },

    /// A value failed a construction-time or boundary check.
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ParserError {
    pub(crate) fn required(field: &'static str) -> Self {
        Self::Invalid {
            field,
            reason: "is required".into(),
        }
    }

    /// Returns `true` for a lookup that found no recorded transactions.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if the error stops the block poller.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fetch(_) | Self::Storage(_))
    }
}
