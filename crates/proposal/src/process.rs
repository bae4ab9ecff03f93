// Path: crates/proposal/src/process.rs
//! Whole-proposal validation.
//!
//! Re-derives, from the same committed state, everything a correct
//! proposer would have produced and rejects the proposal on any
//! deviation. All transactions are re-admitted in order so that sequence
//! increments are accounted exactly as they were during construction.

use crate::blob::validate_with_cache;
use crate::cache::OutcomeCache;
use crate::candidate_hash_hex;
use crate::fee;
use opal_api::{AdmissionContext, AnteChain, SquareAssembler, StateAccess};
use opal_telemetry::time::{Phase, Timer};
use opal_telemetry::{error_metrics, proposal_metrics};
use opal_types::app::{decode_blob_tx, is_blob_tx, ChainId, Envelope};
use opal_types::consts::MAX_TX_SIZE;
use opal_types::error::{ErrorCode, ProposalError};
use std::sync::Arc;

/// The outcome of validating a received proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProposalDecision {
    /// The proposal re-derives exactly; vote for it.
    Accept,
    /// The proposal deviates; vote against the whole block.
    Reject {
        /// An operator-diagnosable reason. Does not leak internal state.
        reason: String,
    },
}

impl ProposalDecision {
    /// Returns `true` for [`ProposalDecision::Accept`].
    pub fn is_accept(&self) -> bool {
        matches!(self, ProposalDecision::Accept)
    }
}

fn reject(err: ProposalError) -> ProposalDecision {
    tracing::error!(
        target: "proposal",
        reason = %err,
        code = err.code(),
        "rejected proposal block"
    );
    proposal_metrics().inc_proposals_rejected(err.code());
    error_metrics().inc_error("process_proposal", err.code());
    ProposalDecision::Reject {
        reason: err.to_string(),
    }
}

/// Validates a received proposal's ordered transaction list against
/// committed state.
pub fn validate_proposal(
    state: Arc<dyn StateAccess>,
    ante: &AnteChain,
    cache: &OutcomeCache,
    assembler: &mut dyn SquareAssembler,
    chain_id: ChainId,
    height: u64,
    txs: &[Vec<u8>],
) -> ProposalDecision {
    let _timer = Timer::new(proposal_metrics(), Phase::Validation);

    let mut ctx = AdmissionContext::new(state, height);

    // The protocol-fee transaction is all-or-nothing for the block, so it
    // is checked before anything else.
    if let Err(e) = fee::validate(&ctx, chain_id, txs) {
        return reject(e);
    }

    for (index, raw) in txs.iter().enumerate() {
        if raw.len() > MAX_TX_SIZE {
            return reject(ProposalError::OversizedTx {
                index,
                size: raw.len(),
                max: MAX_TX_SIZE,
            });
        }

        let envelope = if is_blob_tx(raw) {
            let btx = match decode_blob_tx(raw) {
                Ok(btx) => btx,
                Err(e) => {
                    tracing::debug!(
                        target: "proposal",
                        tx = %candidate_hash_hex(raw),
                        error = %e,
                        "blob transaction wrapper is not decodable"
                    );
                    return reject(ProposalError::UndecodableTx { index });
                }
            };

            // Same validation as per-transaction checking: one paying
            // message, valid namespaces, matching sizes, and the share
            // commitment itself. A cached outcome only skips the prework.
            let (from_cache, result) = validate_with_cache(cache, &btx);
            if let Err(source) = result {
                tracing::debug!(
                    target: "proposal",
                    tx = %candidate_hash_hex(raw),
                    from_cache,
                    "blob transaction validation failed"
                );
                return reject(ProposalError::BlobInvalid { index, source });
            }

            if !assembler.append_blob_tx(&btx) {
                return reject(ProposalError::SquareExport(
                    "proposed blob transactions exceed the square capacity".into(),
                ));
            }

            match Envelope::from_bytes(&btx.tx) {
                Ok(envelope) => envelope,
                Err(_) => return reject(ProposalError::UndecodableTx { index }),
            }
        } else {
            let envelope = match Envelope::from_bytes(raw) {
                Ok(envelope) => envelope,
                Err(_) => return reject(ProposalError::UndecodableTx { index }),
            };

            // A plain transaction must not pay for blobs; the data it
            // commits to would not exist in the square.
            if envelope.pay_for_blobs().is_some() {
                return reject(ProposalError::PfbInPlainTx { index });
            }

            if !assembler.append_tx(raw) {
                return reject(ProposalError::SquareExport(
                    "proposed transactions exceed the square capacity".into(),
                ));
            }

            envelope
        };

        // Every transaction is re-admitted so the sequence bookkeeping
        // matches the proposer's exactly.
        ctx = match ante.check(ctx, &envelope, false) {
            Ok(next) => next,
            Err(source) => {
                return reject(ProposalError::AdmissionFailed { index, source });
            }
        };
    }

    if let Err(e) = assembler.export() {
        return reject(ProposalError::SquareExport(e.to_string()));
    }

    ProposalDecision::Accept
}
