//! Transaction filter: selects the transactions of a block that touch a
//! subscribed address.

use crate::registry::RegistrySnapshot;
use crate::types::{Address, AddressBatch, Block};

/// Group the block's transactions by every subscribed address they touch.
///
/// Both sides of a transaction are tested independently. When `from` and
/// `to` are both subscribed the transaction is appended to each list,
/// including twice to the same list when `from == to`. Order within a list
/// follows the block's transaction order. An empty `to` never matches.
pub fn match_block(block: &Block, subscribed: &RegistrySnapshot<'_>) -> AddressBatch {
    let mut batch = AddressBatch::new();
    if subscribed.is_empty() {
        return batch;
    }

    for tx in block.transactions() {
        let from = Address::new(tx.from());
        let to = Address::new(tx.to());
        let from_hit = subscribed.contains(&from);
        let to_hit = !to.is_empty() && subscribed.contains(&to);

        if from_hit {
            batch.entry(from).or_default().push(tx.clone());
        }
        if to_hit {
            batch.entry(to).or_default().push(tx.clone());
        }
    }
    batch
}

/// Total number of recorded entries in a batch.
pub fn entry_count(batch: &AddressBatch) -> usize {
    batch.values().map(Vec::len).sum()
}
