//! Storage contract for the address → transactions index.

use async_trait::async_trait;

use crate::error::ParserError;
use crate::types::{Address, AddressBatch, Transaction};

/// Append-only, per-address transaction lists.
///
/// Implementations handle their own concurrency; callers add no locking.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Append each list in `batch` to its address, preserving list order.
    async fn save(&self, batch: AddressBatch) -> Result<(), ParserError>;

    /// All transactions recorded for `address`, oldest first.
    ///
    /// Returns [`ParserError::NotFound`] when nothing was ever recorded.
    async fn transactions(&self, address: &Address) -> Result<Vec<Transaction>, ParserError>;
}
