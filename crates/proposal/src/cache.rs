// Path: crates/proposal/src/cache.rs
//! The concurrent transaction outcome cache.
//!
//! Per-transaction admission checking runs concurrently from many callers;
//! the cache lets an expensive validity check performed there be trusted a
//! second time at proposal time without recomputation. The cache is
//! strictly advisory: a hit only ever skips work, it never relaxes which
//! checks are semantically required.
//!
//! Entries never expire by time. Validity is a function of chain height,
//! not wall-clock time, so removal is driven only by explicit lifecycle
//! events: finalization of the transaction into a committed block, or a
//! defensive [`OutcomeCache::clear`].

use dashmap::DashMap;
use opal_types::app::{sha256, TxHash};

/// A concurrent, content-addressed map from a transaction's byte hash to a
/// previously computed validity outcome.
#[derive(Debug, Default)]
pub struct OutcomeCache {
    entries: DashMap<TxHash, bool>,
}

impl OutcomeCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn key(tx_bytes: &[u8]) -> Option<TxHash> {
        match sha256(tx_bytes) {
            Ok(hash) => Some(hash),
            Err(e) => {
                // The cache is advisory; a hashing failure only costs the
                // fast path.
                tracing::error!(target: "admission", error = %e, "failed to hash transaction for outcome cache");
                None
            }
        }
    }

    /// Records the outcome for the given transaction bytes. The last write
    /// for a key wins; safe under arbitrary concurrent callers.
    pub fn set(&self, tx_bytes: &[u8], outcome: bool) {
        if let Some(key) = Self::key(tx_bytes) {
            self.entries.insert(key, outcome);
        }
    }

    /// Looks up a previously recorded outcome. Absence is not an error; it
    /// only means no fast path is available.
    pub fn get(&self, tx_bytes: &[u8]) -> Option<bool> {
        let key = Self::key(tx_bytes)?;
        self.entries.get(&key).map(|entry| *entry.value())
    }

    /// Deletes the entry for the given transaction bytes, if present.
    /// Called when the transaction is finalized into a committed block.
    pub fn remove(&self, tx_bytes: &[u8]) {
        if let Some(key) = Self::key(tx_bytes) {
            self.entries.remove(&key);
        }
    }

    /// Deletes all entries.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// The exact number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn set_get_remove_clear() {
        let cache = OutcomeCache::new();
        assert_eq!(cache.get(b"tx"), None);

        cache.set(b"tx", true);
        assert_eq!(cache.get(b"tx"), Some(true));
        assert_eq!(cache.len(), 1);

        // Last write wins.
        cache.set(b"tx", false);
        assert_eq!(cache.get(b"tx"), Some(false));
        assert_eq!(cache.len(), 1);

        cache.remove(b"tx");
        assert_eq!(cache.get(b"tx"), None);
        assert!(cache.is_empty());

        cache.set(b"a", true);
        cache.set(b"b", true);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn concurrent_writers_produce_exact_size() {
        const WRITERS: usize = 8;
        const KEYS_PER_WRITER: usize = 100;

        let cache = Arc::new(OutcomeCache::new());
        let mut handles = Vec::new();
        for w in 0..WRITERS {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                for k in 0..KEYS_PER_WRITER {
                    let key = format!("writer-{}-key-{}", w, k);
                    cache.set(key.as_bytes(), k % 2 == 0);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), WRITERS * KEYS_PER_WRITER);
    }

    #[test]
    fn concurrent_removal_and_insertion_of_disjoint_sets() {
        const N: usize = 200;

        let cache = Arc::new(OutcomeCache::new());
        for i in 0..N {
            cache.set(format!("old-{}", i).as_bytes(), true);
        }

        let remover = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..N {
                    cache.remove(format!("old-{}", i).as_bytes());
                }
            })
        };
        let inserter = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..N {
                    cache.set(format!("new-{}", i).as_bytes(), false);
                }
            })
        };
        remover.join().unwrap();
        inserter.join().unwrap();

        assert_eq!(cache.len(), N);
        for i in 0..N {
            assert_eq!(cache.get(format!("old-{}", i).as_bytes()), None);
            assert_eq!(cache.get(format!("new-{}", i).as_bytes()), Some(false));
        }
    }
}
