// Path: crates/types/src/keys.rs
//! Defines constants for well-known state keys.
//!
//! Balances and sequences live in the ledger's state tree under these
//! prefixes. The admission core only ever reads them; all writes happen in
//! the ledger modules.

use crate::app::AccountId;

/// Prefix for per-account, per-denomination balances.
pub const BALANCE_PREFIX: &[u8] = b"bank::balance::";

/// Prefix for per-account transaction sequences.
pub const SEQUENCE_PREFIX: &[u8] = b"auth::sequence::";

/// Returns the state key holding `account`'s balance of `denom`.
pub fn balance_key(account: &AccountId, denom: &str) -> Vec<u8> {
    [BALANCE_PREFIX, account.as_ref(), b"::", denom.as_bytes()].concat()
}

/// Returns the state key holding `account`'s next transaction sequence.
pub fn sequence_key(account: &AccountId) -> Vec<u8> {
    [SEQUENCE_PREFIX, account.as_ref()].concat()
}
