//! Reader-facing facade over the shared parser state and the store.

use std::sync::Arc;

use crate::config::PollerConfig;
use crate::error::ParserError;
use crate::poller::BlockPoller;
use crate::registry::SubscriptionRegistry;
use crate::source::BlockSource;
use crate::store::TransactionStore;
use crate::types::{Address, Transaction};
use crate::watermark::Watermark;

/// State shared between the poller task and every reader.
#[derive(Debug, Default)]
pub struct ParserState {
    pub registry: SubscriptionRegistry,
    pub watermark: Watermark,
}

/// Cheaply cloneable handle used by the query layer.
#[derive(Clone)]
pub struct TxParser {
    state: Arc<ParserState>,
    store: Arc<dyn TransactionStore>,
}

impl TxParser {
    pub fn new(store: Arc<dyn TransactionStore>) -> Self {
        Self {
            state: Arc::new(ParserState::default()),
            store,
        }
    }

    /// Highest fully processed block; `0` means nothing processed yet.
    pub fn current_block(&self) -> u64 {
        self.state.watermark.get()
    }

    /// Returns `true` if `address` was newly subscribed.
    pub fn subscribe(&self, address: &str) -> bool {
        let added = self.state.registry.subscribe(address);
        if added {
            tracing::info!(address = %Address::new(address), "address subscribed");
        }
        added
    }

    /// Every transaction recorded for `address`, in block-then-transaction order.
    pub async fn transactions(&self, address: &str) -> Result<Vec<Transaction>, ParserError> {
        let address = Address::new(address);
        let result = self.store.transactions(&address).await;
        if let Err(e) = &result {
            if e.is_not_found() {
                tracing::debug!(
                    %address,
                    subscribed = self.state.registry.is_subscribed(address.as_str()),
                    "no transactions recorded"
                );
            }
        }
        result
    }

    /// Build a poller that writes into this parser's state and store.
    pub fn poller<S: BlockSource>(&self, source: S, config: PollerConfig) -> BlockPoller<S> {
        BlockPoller::new(
            source,
            Arc::clone(&self.store),
            Arc::clone(&self.state),
            config,
        )
    }

    pub fn state(&self) -> &Arc<ParserState> {
        &self.state
    }
}
