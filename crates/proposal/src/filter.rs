// Path: crates/proposal/src/filter.rs
//! The speculative admission filter.
//!
//! Filters candidate transactions and blobs using a branch of the chain
//! state and the admission rules before adding them to the square. The two
//! tracks (plain and blob) are processed independently and in order; a
//! candidate that fails admission has its tentative square contribution
//! reverted and affects nothing processed after it.

use crate::candidate_hash_hex;
use opal_api::{AdmissionContext, AnteChain, SquareAssembler};
use opal_telemetry::proposal_metrics;
use opal_types::app::{encode_blob_tx, BlobTx, CandidateTx, Envelope};
use opal_types::consts::{MAX_BLOB_MESSAGES, MAX_PLAIN_MESSAGES};
use opal_types::error::ProposalError;

/// Filters candidates into the square using a copy of the state and the
/// transaction validity rules before adding them to the square.
pub struct FilteredSquareFill<'a> {
    ctx: AdmissionContext,
    ante: &'a AnteChain,
    assembler: &'a mut dyn SquareAssembler,
}

impl<'a> FilteredSquareFill<'a> {
    /// Creates a filter over a fresh admission context and an empty
    /// assembler.
    pub fn new(
        ctx: AdmissionContext,
        ante: &'a AnteChain,
        assembler: &'a mut dyn SquareAssembler,
    ) -> Self {
        Self {
            ctx,
            ante,
            assembler,
        }
    }

    /// Runs the two-track admission algorithm and returns the kept wire
    /// transactions: all kept plain transactions followed by all kept blob
    /// transactions in their canonical wire form.
    pub fn fill(mut self, candidates: Vec<CandidateTx>) -> Result<Vec<Vec<u8>>, ProposalError> {
        let (plain, blobs) = separate_candidates(candidates);

        let kept_plain = self.fill_plain(plain);
        let kept_blobs = self.fill_blobs(blobs);

        let mut kept = Vec::with_capacity(kept_plain.len() + kept_blobs.len());
        kept.extend(kept_plain);
        for btx in kept_blobs {
            // The unit passed admission moments ago; failing to re-encode
            // it is a defensive fault that aborts the whole attempt.
            let raw = encode_blob_tx(&btx).map_err(|e| {
                ProposalError::Internal(format!("re-encoding kept blob transaction: {}", e))
            })?;
            kept.push(raw);
        }
        Ok(kept)
    }

    fn fill_plain(&mut self, candidates: Vec<Vec<u8>>) -> Vec<Vec<u8>> {
        let mut kept = Vec::with_capacity(candidates.len());
        let mut message_count = 0usize;

        for raw in candidates {
            let envelope = match Envelope::from_bytes(&raw) {
                Ok(envelope) => envelope,
                Err(e) => {
                    tracing::error!(
                        target: "proposal",
                        tx = %candidate_hash_hex(&raw),
                        error = %e,
                        "decoding already checked transaction"
                    );
                    proposal_metrics().inc_invalid_plain_candidates();
                    continue;
                }
            };

            if message_count + envelope.msgs.len() > MAX_PLAIN_MESSAGES {
                tracing::debug!(
                    target: "proposal",
                    tx = %candidate_hash_hex(&raw),
                    "skipping tx because the max plain message count was reached"
                );
                continue;
            }

            if !self.assembler.append_tx(&raw) {
                // The square has no room for plain transactions of this
                // shape; nothing later in the track can fit either.
                break;
            }
            message_count += envelope.msgs.len();

            match self.ante.check(self.ctx.branch(), &envelope, false) {
                Ok(next) => {
                    self.ctx = next;
                    kept.push(raw);
                }
                Err(e) => {
                    tracing::error!(
                        target: "proposal",
                        tx = %candidate_hash_hex(&raw),
                        error = %e,
                        "filtering already checked transaction"
                    );
                    proposal_metrics().inc_invalid_plain_candidates();
                    if let Err(revert_err) = self.assembler.revert_last_tx() {
                        tracing::error!(
                            target: "proposal",
                            error = %revert_err,
                            "reverting last transaction"
                        );
                    }
                }
            }
        }
        kept
    }

    fn fill_blobs(&mut self, candidates: Vec<BlobTx>) -> Vec<BlobTx> {
        let mut kept = Vec::with_capacity(candidates.len());
        let mut message_count = 0usize;

        for btx in candidates {
            let envelope = match Envelope::from_bytes(&btx.tx) {
                Ok(envelope) => envelope,
                Err(e) => {
                    tracing::error!(
                        target: "proposal",
                        tx = %candidate_hash_hex(&btx.tx),
                        error = %e,
                        "decoding already checked blob transaction"
                    );
                    proposal_metrics().inc_invalid_blob_candidates();
                    continue;
                }
            };

            if message_count + envelope.msgs.len() > MAX_BLOB_MESSAGES {
                tracing::debug!(
                    target: "proposal",
                    tx = %candidate_hash_hex(&btx.tx),
                    "skipping tx because the max blob message count was reached"
                );
                continue;
            }

            if !self.assembler.append_blob_tx(&btx) {
                break;
            }
            message_count += envelope.msgs.len();

            match self.ante.check(self.ctx.branch(), &envelope, false) {
                Ok(next) => {
                    self.ctx = next;
                    kept.push(btx);
                }
                Err(e) => {
                    tracing::error!(
                        target: "proposal",
                        tx = %candidate_hash_hex(&btx.tx),
                        error = %e,
                        "filtering already checked blob transaction"
                    );
                    proposal_metrics().inc_invalid_blob_candidates();
                    if let Err(revert_err) = self.assembler.revert_last_blob_tx() {
                        tracing::error!(
                            target: "proposal",
                            error = %revert_err,
                            "reverting last blob transaction failed"
                        );
                    }
                }
            }
        }
        kept
    }
}

/// Partitions candidates into the plain and blob tracks, preserving the
/// order within each track.
pub fn separate_candidates(candidates: Vec<CandidateTx>) -> (Vec<Vec<u8>>, Vec<BlobTx>) {
    let mut plain = Vec::with_capacity(candidates.len());
    let mut blobs = Vec::new();
    for candidate in candidates {
        match candidate {
            CandidateTx::Plain(raw) => plain.push(raw),
            CandidateTx::Blob(btx) => blobs.push(btx),
        }
    }
    (plain, blobs)
}
