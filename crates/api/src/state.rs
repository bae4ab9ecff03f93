// Path: crates/api/src/state.rs
//! Core traits for state access on the transaction-admission path.
//!
//! The admission pipeline is single-threaded per height, so these traits
//! are synchronous; concurrency lives in the outcome cache, not here.

use opal_types::app::AccountId;
use opal_types::codec;
use opal_types::error::StateError;
use opal_types::keys;

/// Basic key-value access to chain state.
///
/// Reads are served from whatever view the implementor represents
/// (committed state, or a speculative branch layered over it). Writes only
/// ever target speculative views on this path; committed state is written
/// by the block-execution machinery, not by admission.
pub trait StateAccess: Send + Sync {
    /// Retrieves a value from the state by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError>;
    /// Inserts a key-value pair into the state view.
    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), StateError>;
    /// Deletes a key from the state view.
    fn delete(&mut self, key: &[u8]) -> Result<(), StateError>;
}

/// Read-side capability over account balances and sequences.
///
/// Consumed by the protocol-fee injector and the admission checks; the
/// derivations that feed consensus decisions go through this trait so that
/// every node reads the same committed values.
pub trait AccountQuery {
    /// Returns `account`'s balance of `denom`, zero if absent.
    fn get_balance(&self, account: &AccountId, denom: &str) -> Result<u128, StateError>;
    /// Returns `account`'s next expected transaction sequence, zero if absent.
    fn get_sequence(&self, account: &AccountId) -> Result<u64, StateError>;
}

/// Reads a balance from any state view using the well-known key layout.
pub fn read_balance(
    state: &dyn StateAccess,
    account: &AccountId,
    denom: &str,
) -> Result<u128, StateError> {
    match state.get(&keys::balance_key(account, denom))? {
        Some(bytes) => codec::from_bytes_canonical(&bytes).map_err(StateError::Decode),
        None => Ok(0),
    }
}

/// Reads a sequence from any state view using the well-known key layout.
pub fn read_sequence(state: &dyn StateAccess, account: &AccountId) -> Result<u64, StateError> {
    match state.get(&keys::sequence_key(account))? {
        Some(bytes) => codec::from_bytes_canonical(&bytes).map_err(StateError::Decode),
        None => Ok(0),
    }
}

/// Writes a sequence into a state view using the well-known key layout.
pub fn write_sequence(
    state: &mut dyn StateAccess,
    account: &AccountId,
    sequence: u64,
) -> Result<(), StateError> {
    let bytes = codec::to_bytes_canonical(&sequence).map_err(StateError::Backend)?;
    state.set(&keys::sequence_key(account), &bytes)
}
