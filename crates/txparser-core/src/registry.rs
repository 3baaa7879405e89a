//! Subscription registry: the live set of addresses whose transactions are recorded.
//!
//! Many readers (the filter, membership checks) share the set with one
//! serialized writer path (`subscribe`). There is no removal: a subscription
//! lives for the lifetime of the process.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use crate::types::Address;

/// Idempotent, grow-only set of canonical addresses.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    addresses: RwLock<HashSet<Address>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize `address` and add it.
    ///
    /// Returns `true` if it was newly added, `false` if already present.
    pub fn subscribe(&self, address: &str) -> bool {
        let address = Address::new(address);
        self.addresses
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(address)
    }

    /// Returns `true` if the normalized `address` is subscribed.
    pub fn is_subscribed(&self, address: &str) -> bool {
        self.snapshot().contains(&Address::new(address))
    }

    /// Number of subscribed addresses.
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hold the read lock for a consistent view of the set.
    ///
    /// Writers block until the snapshot is dropped, so keep it short and
    /// never hold it across an `.await`.
    pub fn snapshot(&self) -> RegistrySnapshot<'_> {
        RegistrySnapshot {
            guard: self
                .addresses
                .read()
                .unwrap_or_else(PoisonError::into_inner),
        }
    }
}

/// A read-locked view of the [`SubscriptionRegistry`].
pub struct RegistrySnapshot<'a> {
    guard: RwLockReadGuard<'a, HashSet<Address>>,
}

impl RegistrySnapshot<'_> {
    pub fn contains(&self, address: &Address) -> bool {
        self.guard.contains(address)
    }

    pub fn len(&self) -> usize {
        self.guard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_is_idempotent() {
        let registry = SubscriptionRegistry::new();
        assert!(registry.subscribe("0xabc123"));
        assert!(!registry.subscribe("0xabc123"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn subscribe_ignores_letter_case() {
        let registry = SubscriptionRegistry::new();
        assert!(registry.subscribe("0xABCDEF"));
        assert!(!registry.subscribe("0xabcdef"));
        assert!(!registry.subscribe("0xAbCdEf"));
        assert!(registry.is_subscribed("0xabcdef"));
        assert!(registry.is_subscribed("0xABCDEF"));
    }

    #[test]
    fn snapshot_sees_canonical_form() {
        let registry = SubscriptionRegistry::new();
        registry.subscribe("0xDEAD");
        let snap = registry.snapshot();
        assert!(snap.contains(&Address::new("0xdead")));
        assert!(!snap.contains(&Address::new("0xbeef")));
        assert_eq!(snap.len(), 1);
    }

    #[test]
    fn concurrent_subscribers_add_once() {
        use std::sync::Arc;

        let registry = Arc::new(SubscriptionRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.subscribe("0xFeed"))
            })
            .collect();
        let added = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&added| added)
            .count();
        assert_eq!(added, 1);
        assert_eq!(registry.len(), 1);
    }
}
