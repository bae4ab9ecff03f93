// Path: crates/api/src/admission.rs
//! Composition of ordered admission checks.
//!
//! The ledger's per-transaction rules are expressed as an ordered list of
//! capability closures over the admission context; the chain applies them
//! sequentially, each check receiving the context produced by the previous
//! one. No inheritance or dynamic dispatch hierarchy is involved.

use crate::context::AdmissionContext;
use opal_types::app::Envelope;
use opal_types::error::TransactionError;

/// A single admission rule.
///
/// The check consumes a candidate context and either returns the updated
/// context (possibly with speculative writes applied) or a typed failure.
/// `simulate` distinguishes pool-side checking from proposal construction;
/// rules must not mutate anything outside the context they are handed.
pub type AdmissionCheck = Box<
    dyn Fn(AdmissionContext, &Envelope, bool) -> Result<AdmissionContext, TransactionError>
        + Send
        + Sync,
>;

/// An ordered chain of admission checks applied by sequential composition.
pub struct AnteChain {
    checks: Vec<AdmissionCheck>,
}

impl AnteChain {
    /// Builds a chain from an ordered list of checks.
    pub fn new(checks: Vec<AdmissionCheck>) -> Self {
        Self { checks }
    }

    /// Applies every check in order, threading the context through.
    ///
    /// The first failure wins; the caller decides whether to keep the prior
    /// context (the chain never mutates its input, it only produces a new
    /// one).
    pub fn check(
        &self,
        ctx: AdmissionContext,
        tx: &Envelope,
        simulate: bool,
    ) -> Result<AdmissionContext, TransactionError> {
        let mut ctx = ctx;
        for check in &self.checks {
            ctx = check(ctx, tx, simulate)?;
        }
        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateAccess;
    use crate::test_utils::MemState;
    use opal_types::app::{AccountId, ChainId, Envelope, Fee, Msg, SignHeader, SignatureProof};
    use std::sync::Arc;

    fn tx() -> Envelope {
        Envelope {
            header: SignHeader {
                account_id: AccountId([1u8; 32]),
                nonce: 0,
                chain_id: ChainId(1),
            },
            msgs: vec![Msg::ForwardProtocolFees],
            fee: Fee::default(),
            signature_proof: SignatureProof::default(),
        }
    }

    #[test]
    fn checks_run_in_order_and_thread_the_context() {
        let chain = AnteChain::new(vec![
            Box::new(|mut ctx, _tx, _sim| {
                ctx.set(b"first", b"1").unwrap();
                Ok(ctx)
            }),
            Box::new(|ctx, _tx, _sim| {
                assert_eq!(ctx.get(b"first").unwrap(), Some(b"1".to_vec()));
                Ok(ctx)
            }),
        ]);

        let ctx = AdmissionContext::new(Arc::new(MemState::new()), 1);
        chain.check(ctx, &tx(), false).unwrap();
    }

    #[test]
    fn first_failure_wins() {
        let chain = AnteChain::new(vec![
            Box::new(|_ctx, _tx, _sim| Err(TransactionError::Invalid("stop".into()))),
            Box::new(|_ctx, _tx, _sim| panic!("must not run after a failure")),
        ]);

        let ctx = AdmissionContext::new(Arc::new(MemState::new()), 1);
        assert!(chain.check(ctx, &tx(), false).is_err());
    }
}
