// Path: crates/proposal/src/lib.rs

//! Transaction admission and block-proposal filtering for the Opal kernel.
//!
//! This crate turns a pool of candidate transactions into a canonical,
//! network-agreed proposal and re-validates proposals received from other
//! nodes. Every decision is derived deterministically from committed state
//! and the consensus constants; two honest nodes observing the same state
//! must produce and accept byte-identical results.

/// The reference admission-check chain.
pub mod ante;
/// Cache-assisted blob transaction validation.
pub mod blob;
/// The concurrent transaction outcome cache.
pub mod cache;
/// Per-transaction admission checking.
pub mod check;
/// The deterministic protocol-fee transaction.
pub mod fee;
/// The speculative admission filter.
pub mod filter;
/// Proposal construction.
pub mod prepare;
/// Whole-proposal validation.
pub mod process;

pub use cache::OutcomeCache;
pub use process::ProposalDecision;

use opal_api::{AnteChain, SquareAssembler, StateAccess};
use opal_types::app::{sha256, ChainId};
use opal_types::error::{ProposalError, TransactionError};
use std::sync::Arc;

/// Renders a transaction's content hash for logging.
pub(crate) fn candidate_hash_hex(raw: &[u8]) -> String {
    match sha256(raw) {
        Ok(hash) => hex::encode(hash),
        Err(_) => format!("len:{}", raw.len()),
    }
}

/// A factory producing a fresh, empty square assembler per proposal attempt.
pub type AssemblerFactory = Box<dyn Fn() -> Box<dyn SquareAssembler> + Send + Sync>;

/// The admission and proposal pipeline, bound to its capabilities.
///
/// One pipeline serves one chain: it holds the committed-state handle, the
/// admission rules, the outcome cache and the square-assembler factory,
/// and exposes the four operations the surrounding consensus machinery
/// drives.
pub struct Pipeline {
    state: Arc<dyn StateAccess>,
    chain_id: ChainId,
    ante: AnteChain,
    cache: Arc<OutcomeCache>,
    new_assembler: AssemblerFactory,
}

impl Pipeline {
    /// Creates a pipeline over committed state and capabilities.
    pub fn new(
        state: Arc<dyn StateAccess>,
        chain_id: ChainId,
        ante: AnteChain,
        new_assembler: AssemblerFactory,
    ) -> Self {
        Self {
            state,
            chain_id,
            ante,
            cache: Arc::new(OutcomeCache::new()),
            new_assembler,
        }
    }

    /// The shared outcome cache. Concurrent per-transaction checkers hold
    /// clones of this handle.
    pub fn outcome_cache(&self) -> Arc<OutcomeCache> {
        Arc::clone(&self.cache)
    }

    /// Checks one raw transaction for admission into the pool, populating
    /// the outcome cache.
    pub fn check_transaction(
        &self,
        raw: &[u8],
        height: u64,
        is_recheck: bool,
    ) -> Result<(), TransactionError> {
        check::check_transaction(
            Arc::clone(&self.state),
            &self.ante,
            &self.cache,
            height,
            raw,
            is_recheck,
        )
    }

    /// Builds the ordered transaction list for a new proposal at `height`.
    pub fn build_proposal(
        &self,
        candidates: Vec<Vec<u8>>,
        height: u64,
    ) -> Result<Vec<Vec<u8>>, ProposalError> {
        let mut assembler = (self.new_assembler)();
        prepare::build_proposal(
            Arc::clone(&self.state),
            &self.ante,
            assembler.as_mut(),
            self.chain_id,
            height,
            candidates,
        )
    }

    /// Re-validates a received proposal at `height`.
    pub fn validate_proposal(&self, txs: &[Vec<u8>], height: u64) -> ProposalDecision {
        let mut assembler = (self.new_assembler)();
        process::validate_proposal(
            Arc::clone(&self.state),
            &self.ante,
            &self.cache,
            assembler.as_mut(),
            self.chain_id,
            height,
            txs,
        )
    }

    /// Drops cache entries for transactions finalized into a committed
    /// block.
    pub fn mark_finalized(&self, txs: &[Vec<u8>]) {
        check::mark_finalized(&self.cache, txs);
    }
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use opal_types::app::blob::SHARE_VERSION_ZERO;
    use opal_types::app::{
        share_commitment, AccountId, Blob, BlobTx, ChainId, Coin, Envelope, Fee, Msg, Namespace,
        PayForBlobs, SignHeader, SignatureProof,
    };
    use opal_types::consts::NATIVE_DENOM;

    pub fn transfer_tx(account: AccountId, nonce: u64) -> Vec<u8> {
        let envelope = Envelope {
            header: SignHeader {
                account_id: account,
                nonce,
                chain_id: ChainId(1),
            },
            msgs: vec![Msg::Transfer {
                from: account,
                to: AccountId([0xee; 32]),
                amount: vec![Coin::new(NATIVE_DENOM, 25)],
            }],
            fee: Fee {
                amount: vec![Coin::new(NATIVE_DENOM, 2)],
                gas_limit: 100_000,
            },
            signature_proof: SignatureProof::default(),
        };
        envelope.to_bytes().unwrap()
    }

    pub fn blob_under_namespace(ns_byte: u8, data_len: usize) -> Blob {
        let namespace = Namespace::new_v0(&[ns_byte; 6]).unwrap();
        Blob::new(namespace, vec![ns_byte ^ 0x5a; data_len], SHARE_VERSION_ZERO).unwrap()
    }

    pub fn valid_blob_tx(signer: AccountId, nonce: u64, ns_byte: u8, data_len: usize) -> BlobTx {
        let blob = blob_under_namespace(ns_byte, data_len);
        let commitment = share_commitment(&blob).unwrap();
        let envelope = Envelope {
            header: SignHeader {
                account_id: signer,
                nonce,
                chain_id: ChainId(1),
            },
            msgs: vec![Msg::PayForBlobs(PayForBlobs {
                signer,
                namespaces: vec![blob.namespace],
                blob_sizes: vec![blob.data.len() as u32],
                share_commitments: vec![commitment],
            })],
            fee: Fee {
                amount: vec![Coin::new(NATIVE_DENOM, 50)],
                gas_limit: 200_000,
            },
            signature_proof: SignatureProof::default(),
        };
        BlobTx {
            tx: envelope.to_bytes().unwrap(),
            blobs: vec![blob],
        }
    }

    pub fn fee_forward_tx(chain_id: ChainId, denom: &str, amount: u128, gas: u64) -> Vec<u8> {
        let envelope = Envelope {
            header: SignHeader {
                account_id: opal_types::app::fee_address(),
                nonce: 0,
                chain_id,
            },
            msgs: vec![Msg::ForwardProtocolFees],
            fee: Fee {
                amount: vec![Coin::new(denom, amount)],
                gas_limit: gas,
            },
            signature_proof: SignatureProof::default(),
        };
        envelope.to_bytes().unwrap()
    }
}
