//! In-memory transaction store.
//!
//! All data is lost when the process exits.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use tracing::debug;

use txparser_core::error::ParserError;
use txparser_core::store::TransactionStore;
use txparser_core::types::{Address, AddressBatch, Transaction};

/// Address → transactions, guarded by a single reader/writer lock.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    data: RwLock<HashMap<Address, Vec<Transaction>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of addresses with at least one recorded transaction.
    pub fn address_count(&self) -> usize {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl TransactionStore for InMemoryStore {
    async fn save(&self, batch: AddressBatch) -> Result<(), ParserError> {
        let addresses = batch.len();
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        for (address, txs) in batch {
            data.entry(address).or_default().extend(txs);
        }
        debug!(addresses, "transactions stored");
        Ok(())
    }

    async fn transactions(&self, address: &Address) -> Result<Vec<Transaction>, ParserError> {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(address)
            .cloned()
            .ok_or_else(|| ParserError::NotFound {
                address: address.clone(),
            })
    }
}
