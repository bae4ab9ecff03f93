// Path: crates/proposal/src/check.rs
//! Per-transaction admission checking.
//!
//! This is the pool-side entry point: it runs ahead of proposal
//! construction, concurrently with other checks, and is the only writer
//! that populates the outcome cache. All speculative state effects are
//! confined to a context branch that is dropped on return.

use crate::cache::OutcomeCache;
use crate::candidate_hash_hex;
use opal_api::{AdmissionContext, AnteChain, StateAccess};
use opal_telemetry::proposal_metrics;
use opal_types::app::blob::validate_blob_tx;
use opal_types::app::{CandidateTx, Envelope};
use opal_types::consts::MAX_TX_SIZE;
use opal_types::error::{BlobError, TransactionError};
use std::sync::Arc;

/// Checks one raw transaction for admission into the pool.
///
/// Valid blob transactions record a `true` outcome in the cache; a
/// commitment mismatch records `false` (the outcome is intrinsic to the
/// bytes). State-dependent failures such as a nonce gap record nothing,
/// since they may stop holding at the next height.
pub fn check_transaction(
    state: Arc<dyn StateAccess>,
    ante: &AnteChain,
    cache: &OutcomeCache,
    height: u64,
    raw: &[u8],
    is_recheck: bool,
) -> Result<(), TransactionError> {
    if raw.len() > MAX_TX_SIZE {
        return Err(TransactionError::Oversized {
            size: raw.len(),
            max: MAX_TX_SIZE,
        });
    }

    let candidate = CandidateTx::classify(raw.to_vec())
        .map_err(|e| TransactionError::Decode(e.to_string()))?;

    let envelope = match &candidate {
        CandidateTx::Plain(bytes) => {
            Envelope::from_bytes(bytes).map_err(|e| TransactionError::Decode(e.to_string()))?
        }
        CandidateTx::Blob(btx) => {
            // On a recheck the structural and commitment work is already on
            // record; the bytes have not changed since the pool accepted them.
            let already_valid = is_recheck && cache.get(raw) == Some(true);
            if !already_valid {
                if let Err(e) = validate_blob_tx(btx) {
                    if matches!(e, BlobError::CommitmentMismatch { .. }) {
                        cache.set(raw, false);
                        proposal_metrics().set_outcome_cache_size(cache.len() as f64);
                    }
                    tracing::debug!(
                        target: "admission",
                        tx = %candidate_hash_hex(raw),
                        error = %e,
                        "rejected blob transaction"
                    );
                    return Err(TransactionError::Blob(e));
                }
            }
            Envelope::from_bytes(&btx.tx)
                .map_err(|e| TransactionError::Decode(e.to_string()))?
        }
    };

    let ctx = AdmissionContext::new(state, height);
    ante.check(ctx, &envelope, true)?;

    cache.set(raw, true);
    proposal_metrics().set_outcome_cache_size(cache.len() as f64);
    Ok(())
}

/// Drops the outcome-cache entries of transactions finalized into a
/// committed block. The next block starts clean for those hashes.
pub fn mark_finalized(cache: &OutcomeCache, txs: &[Vec<u8>]) {
    for raw in txs {
        cache.remove(raw);
    }
    proposal_metrics().set_outcome_cache_size(cache.len() as f64);
}
