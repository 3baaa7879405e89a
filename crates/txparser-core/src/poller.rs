//! The block poller. Keeps the watermark caught up to the chain head.
//!
//! # Bootstrap
//! Runs once, only while the watermark is unset: fetch the head block,
//! process it, set the watermark to its number.
//!
//! # Steady state
//! Every `poll_interval_ms`, fetch the head. If it is ahead of the
//! watermark, fetch and process every block from `watermark + 1` through
//! the head, one at a time in ascending order, then advance the watermark
//! once to the head.
//!
//! # Stopped
//! Any fetch or storage failure is logged and ends the loop; it is never
//! retried here and the watermark stays where it was before the failed run.
//! Cancellation ends the loop cleanly. Either way the poller is consumed.

use std::sync::Arc;

use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::PollerConfig;
use crate::error::ParserError;
use crate::filter;
use crate::parser::ParserState;
use crate::source::BlockSource;
use crate::store::TransactionStore;
use crate::types::{Block, BlockTag};

/// Result of a single steady-state poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The head has not moved past the watermark.
    Idle,
    /// The source reported a head below the watermark; nothing was done.
    HeadBehind { head: u64, watermark: u64 },
    /// Blocks `from..=to` were processed and the watermark moved to `to`.
    CaughtUp { from: u64, to: u64 },
    /// Cancellation was observed mid-run; the watermark was not moved.
    Cancelled,
}

/// Drives a [`BlockSource`] into the shared parser state and store.
pub struct BlockPoller<S> {
    source: S,
    store: Arc<dyn TransactionStore>,
    state: Arc<ParserState>,
    config: PollerConfig,
}

impl<S: BlockSource> BlockPoller<S> {
    pub fn new(
        source: S,
        store: Arc<dyn TransactionStore>,
        state: Arc<ParserState>,
        config: PollerConfig,
    ) -> Self {
        Self {
            source,
            store,
            state,
            config,
        }
    }

    /// Run until cancelled or until the first fatal error.
    ///
    /// Returns `Ok(())` on cancellation and the fatal error otherwise.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), ParserError> {
        if self.state.watermark.is_unset() {
            if shutdown.is_cancelled() {
                tracing::info!("poller cancelled before bootstrap");
                return Ok(());
            }
            if let Err(e) = self.bootstrap().await {
                tracing::error!(error = %e, "bootstrap failed, poller stopped");
                return Err(e);
            }
        }

        let period = self.config.poll_interval();
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            match self.tick(&shutdown).await {
                Ok(TickOutcome::Cancelled) => break,
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        watermark = self.state.watermark.get(),
                        "poll failed, poller stopped"
                    );
                    return Err(e);
                }
            }
        }

        tracing::info!(watermark = self.state.watermark.get(), "poller cancelled");
        Ok(())
    }

    /// Seed the watermark from the current chain head.
    ///
    /// Returns the head block number.
    pub async fn bootstrap(&self) -> Result<u64, ParserError> {
        let head = self.source.fetch_block(BlockTag::Latest).await?;
        let number = head.number();
        self.process_block(&head).await?;
        self.state.watermark.set(number);
        tracing::info!(block = number, hash = %head.hash(), "bootstrapped from chain head");
        Ok(number)
    }

    /// Poll the head once and backfill every block up to it.
    ///
    /// Cancellation is checked before each backfill fetch; an in-flight fetch
    /// is not interrupted.
    pub async fn tick(&self, shutdown: &CancellationToken) -> Result<TickOutcome, ParserError> {
        let head = self.source.fetch_block(BlockTag::Latest).await?.number();
        let watermark = self.state.watermark.get();

        if head == watermark {
            tracing::debug!(head, "chain head unchanged");
            return Ok(TickOutcome::Idle);
        }
        if head < watermark {
            tracing::warn!(head, watermark, "source head is behind the watermark");
            return Ok(TickOutcome::HeadBehind { head, watermark });
        }

        let from = watermark + 1;
        for number in from..=head {
            if shutdown.is_cancelled() {
                tracing::info!(next = number, head, "backfill interrupted by cancellation");
                return Ok(TickOutcome::Cancelled);
            }
            let block = self.source.fetch_block(BlockTag::Number(number)).await?;
            if block.number() != number {
                return Err(ParserError::Fetch(format!(
                    "requested block {number}, source returned {}",
                    block.number()
                )));
            }
            self.process_block(&block).await?;
        }

        self.state.watermark.set(head);
        tracing::info!(from, to = head, blocks = head - watermark, "caught up to chain head");
        Ok(TickOutcome::CaughtUp { from, to: head })
    }

    /// Filter one block against a registry snapshot and persist the matches.
    ///
    /// Returns the number of entries saved; a block with no matches makes no
    /// store call.
    pub async fn process_block(&self, block: &Block) -> Result<usize, ParserError> {
        let batch = {
            let snapshot = self.state.registry.snapshot();
            filter::match_block(block, &snapshot)
        };

        if batch.is_empty() {
            tracing::debug!(
                block = block.number(),
                txs = block.transactions().len(),
                "no subscribed transactions"
            );
            return Ok(0);
        }

        let addresses = batch.len();
        let entries = filter::entry_count(&batch);
        self.store.save(batch).await.map_err(|e| match e {
            ParserError::Storage(_) => e,
            other => ParserError::Storage(other.to_string()),
        })?;

        tracing::debug!(block = block.number(), addresses, entries, "block matches saved");
        Ok(entries)
    }
}
