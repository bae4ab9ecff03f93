// Path: crates/api/src/context.rs
//! The branchable admission context.
//!
//! Each attempted transaction is evaluated against a *branch* of the
//! context; only on success is the branch promoted to be the new base for
//! the next attempt. A failed branch is simply dropped, so a rejected
//! transaction leaks no side effects into the state the next candidate
//! sees.

use crate::state::{read_balance, read_sequence, AccountQuery, StateAccess};
use opal_types::app::AccountId;
use opal_types::error::StateError;
use std::collections::BTreeMap;
use std::fmt::{self, Debug};
use std::sync::Arc;

/// A cloneable chain-state handle threaded through the admission filter.
///
/// Reads fall through an in-memory overlay of speculative writes to the
/// shared committed base. Cloning the context branches it: the clone owns
/// an independent copy of the overlay while sharing the immutable base.
/// The filter's commit operation is plain value replacement; discard is
/// plain drop.
#[derive(Clone)]
pub struct AdmissionContext {
    base: Arc<dyn StateAccess>,
    overlay: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
    block_height: u64,
}

impl Debug for AdmissionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdmissionContext")
            .field("overlay_len", &self.overlay.len())
            .field("block_height", &self.block_height)
            .finish()
    }
}

impl AdmissionContext {
    /// Creates a context over a committed state handle for the given height.
    pub fn new(base: Arc<dyn StateAccess>, block_height: u64) -> Self {
        Self {
            base,
            overlay: BTreeMap::new(),
            block_height,
        }
    }

    /// The height of the block being built or validated.
    pub fn block_height(&self) -> u64 {
        self.block_height
    }

    /// Creates an independent speculative branch of this context.
    pub fn branch(&self) -> Self {
        self.clone()
    }
}

impl StateAccess for AdmissionContext {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        if let Some(entry) = self.overlay.get(key) {
            // Some(Some(v)) -> written in this branch.
            // Some(None) -> deleted in this branch, so absent.
            return Ok(entry.clone());
        }
        self.base.get(key)
    }

    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), StateError> {
        self.overlay.insert(key.to_vec(), Some(value.to_vec()));
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StateError> {
        self.overlay.insert(key.to_vec(), None);
        Ok(())
    }
}

impl AccountQuery for AdmissionContext {
    fn get_balance(&self, account: &AccountId, denom: &str) -> Result<u128, StateError> {
        read_balance(self, account, denom)
    }

    fn get_sequence(&self, account: &AccountId) -> Result<u64, StateError> {
        read_sequence(self, account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MemState;

    #[test]
    fn branch_writes_do_not_leak_into_the_parent() {
        let mut base = MemState::new();
        base.set(b"k", b"committed").unwrap();
        let ctx = AdmissionContext::new(Arc::new(base), 5);

        let mut branch = ctx.branch();
        branch.set(b"k", b"speculative").unwrap();
        branch.set(b"k2", b"new").unwrap();

        assert_eq!(branch.get(b"k").unwrap(), Some(b"speculative".to_vec()));
        assert_eq!(ctx.get(b"k").unwrap(), Some(b"committed".to_vec()));
        assert_eq!(ctx.get(b"k2").unwrap(), None);
    }

    #[test]
    fn promoted_branch_becomes_the_new_base_view() {
        let ctx = AdmissionContext::new(Arc::new(MemState::new()), 1);

        let mut working = ctx;
        let mut attempt = working.branch();
        attempt.set(b"a", b"1").unwrap();
        working = attempt; // commit

        let mut failed = working.branch();
        failed.set(b"a", b"poison").unwrap();
        drop(failed); // discard

        assert_eq!(working.get(b"a").unwrap(), Some(b"1".to_vec()));
    }

    #[test]
    fn delete_shadows_the_base() {
        let mut base = MemState::new();
        base.set(b"gone", b"x").unwrap();
        let mut ctx = AdmissionContext::new(Arc::new(base), 1);

        ctx.delete(b"gone").unwrap();
        assert_eq!(ctx.get(b"gone").unwrap(), None);
    }
}
