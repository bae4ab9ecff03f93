// Path: crates/proposal/src/prepare.rs
//! Proposal construction.
//!
//! Turns the candidate pool into the ordered transaction list of a block
//! proposal: the protocol-fee transaction first when one is due, then the
//! admissible plain transactions, then the admissible blob transactions in
//! canonical wire form.

use crate::fee;
use crate::filter::FilteredSquareFill;
use opal_api::{AdmissionContext, AnteChain, SquareAssembler, StateAccess};
use opal_telemetry::time::{Phase, Timer};
use opal_telemetry::proposal_metrics;
use opal_types::app::{CandidateTx, ChainId};
use opal_types::error::ProposalError;
use std::sync::Arc;

/// Builds the ordered transaction list for a new proposal.
pub fn build_proposal(
    state: Arc<dyn StateAccess>,
    ante: &AnteChain,
    assembler: &mut dyn SquareAssembler,
    chain_id: ChainId,
    height: u64,
    raw_candidates: Vec<Vec<u8>>,
) -> Result<Vec<Vec<u8>>, ProposalError> {
    let _timer = Timer::new(proposal_metrics(), Phase::Filter);

    let mut candidates = Vec::with_capacity(raw_candidates.len());
    for raw in raw_candidates {
        match CandidateTx::classify(raw) {
            Ok(candidate) => candidates.push(candidate),
            Err(e) => {
                // By construction the pool only holds decodable bytes;
                // dropping here is defensive.
                tracing::error!(target: "proposal", error = %e, "dropping undecodable candidate");
            }
        }
    }

    let mut txs = Vec::with_capacity(candidates.len() + 1);

    let ctx = AdmissionContext::new(Arc::clone(&state), height);
    if let Some(fee_tx) = fee::prepare(&ctx, chain_id)
        .map_err(|e| ProposalError::Internal(format!("reading fee module balance: {}", e)))?
    {
        let raw = fee_tx
            .to_bytes()
            .map_err(|e| ProposalError::Internal(format!("encoding fee transaction: {}", e)))?;
        if !assembler.append_tx(&raw) {
            return Err(ProposalError::Internal(
                "protocol-fee transaction does not fit in an empty square".into(),
            ));
        }
        txs.push(raw);
    }

    let kept = FilteredSquareFill::new(ctx, ante, assembler).fill(candidates)?;
    txs.extend(kept);
    Ok(txs)
}
