//! Watermark: the highest block number whose matches have been recorded.

use std::sync::atomic::{AtomicU64, Ordering};

/// Sentinel meaning no block has been processed yet.
pub const NONE_PROCESSED: u64 = 0;

/// Single-writer, many-reader progress counter.
///
/// Only the block poller stores into it; readers never block.
#[derive(Debug, Default)]
pub struct Watermark(AtomicU64);

impl Watermark {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value; [`NONE_PROCESSED`] until the first block is recorded.
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    /// Store the number of the newest fully processed block.
    pub fn set(&self, block_number: u64) {
        self.0.store(block_number, Ordering::Release);
    }

    /// Returns `true` while no block has been processed.
    pub fn is_unset(&self) -> bool {
        self.get() == NONE_PROCESSED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unset() {
        let mark = Watermark::new();
        assert!(mark.is_unset());
        assert_eq!(mark.get(), NONE_PROCESSED);
    }

    #[test]
    fn set_then_get() {
        let mark = Watermark::new();
        mark.set(19_000_000);
        assert_eq!(mark.get(), 19_000_000);
        assert!(!mark.is_unset());
    }
}
