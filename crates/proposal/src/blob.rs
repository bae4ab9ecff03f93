// Path: crates/proposal/src/blob.rs
//! Cache-assisted blob transaction validation.
//!
//! A blob transaction that already passed the per-transaction check has
//! its structural validation on record in the outcome cache. The cache is
//! advisory: a hit lets us trust the decode/structure prework, but the
//! commitment arithmetic is recomputed and compared on every path, so a
//! payload tampered with after caching still fails.

use crate::cache::OutcomeCache;
use opal_types::app::blob::{validate_blob_tx, verify_commitments};
use opal_types::app::{encode_blob_tx, BlobTx};
use opal_types::error::BlobError;

/// Validates a blob transaction, using the cached outcome as a fast path.
///
/// Returns `(from_cache, result)`: `from_cache` reports whether the
/// structural prework was skipped; the result is the same on either path —
/// `Ok` if every recomputed commitment equals the embedded one, else the
/// first mismatch.
pub fn validate_with_cache(
    cache: &OutcomeCache,
    btx: &BlobTx,
) -> (bool, Result<(), BlobError>) {
    let raw = match encode_blob_tx(btx) {
        Ok(raw) => raw,
        Err(e) => return (false, Err(BlobError::Decode(e.to_string()))),
    };

    match cache.get(&raw) {
        Some(true) => (true, verify_commitments(btx)),
        // A cached-invalid or absent entry gets the full path; the cache
        // must never widen what is accepted.
        _ => (false, validate_blob_tx(btx)),
    }
}
