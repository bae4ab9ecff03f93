// Path: crates/proposal/src/ante.rs
//! The reference admission-check chain.
//!
//! Each rule is a closure `context × tx -> Result<context, error>`; the
//! pipeline composes them with [`AnteChain`] and applies them to a branch
//! of the admission context, so a failing rule leaves no trace in the
//! state the next candidate sees.

use opal_api::state::{write_sequence, AccountQuery};
use opal_api::{AdmissionCheck, AnteChain};
use opal_types::app::ChainId;
use opal_types::consts::NATIVE_DENOM;
use opal_types::error::TransactionError;

/// Rejects transactions addressed to a different chain.
pub fn chain_id_check(expected: ChainId) -> AdmissionCheck {
    Box::new(move |ctx, tx, _simulate| {
        if tx.header.chain_id != expected {
            return Err(TransactionError::Invalid(format!(
                "chain id {} does not match {}",
                tx.header.chain_id.0, expected.0
            )));
        }
        Ok(ctx)
    })
}

/// Enforces strict nonce ordering and increments the account sequence.
///
/// The increment is written into the candidate context so that a later
/// transaction from the same signer within the same proposal sees the
/// updated sequence. This is why the filter runs single-threaded.
pub fn nonce_check() -> AdmissionCheck {
    Box::new(|mut ctx, tx, _simulate| {
        let expected = ctx.get_sequence(&tx.header.account_id)?;
        if tx.header.nonce != expected {
            return Err(TransactionError::NonceMismatch {
                expected,
                got: tx.header.nonce,
            });
        }
        write_sequence(&mut ctx, &tx.header.account_id, expected + 1)?;
        Ok(ctx)
    })
}

/// Rejects fees declared in anything but the native denomination.
pub fn fee_denom_check() -> AdmissionCheck {
    Box::new(|ctx, tx, _simulate| {
        for coin in &tx.fee.amount {
            if coin.denom != NATIVE_DENOM {
                return Err(TransactionError::Fee(format!(
                    "fee denom {} is not {}",
                    coin.denom, NATIVE_DENOM
                )));
            }
        }
        Ok(ctx)
    })
}

/// Terminates user-submitted protocol-fee transactions.
///
/// The protocol-fee transaction is synthesized by proposers; it never
/// enters the pool. During pool-side checking (`simulate = true`) any
/// transaction carrying the message is rejected outright. During proposal
/// replay the message is allowed but must be the transaction's only
/// message with a single native fee coin.
pub fn fee_forward_terminator() -> AdmissionCheck {
    Box::new(|ctx, tx, simulate| {
        if !tx.has_fee_forward() {
            return Ok(ctx);
        }
        if simulate {
            return Err(TransactionError::UnauthorizedMessage(
                "protocol-fee transactions cannot be submitted by users".into(),
            ));
        }
        if tx.msgs.len() != 1 {
            return Err(TransactionError::UnauthorizedMessage(
                "protocol-fee transaction must carry exactly one message".into(),
            ));
        }
        if tx.fee.amount.len() != 1 || tx.fee.amount[0].denom != NATIVE_DENOM {
            return Err(TransactionError::Fee(
                "protocol-fee transaction must pay exactly one native fee coin".into(),
            ));
        }
        Ok(ctx)
    })
}

/// Builds the default admission chain used by the pipeline.
pub fn default_checks(chain_id: ChainId) -> AnteChain {
    AnteChain::new(vec![
        chain_id_check(chain_id),
        fee_forward_terminator(),
        fee_denom_check(),
        nonce_check(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use opal_api::test_utils::MemState;
    use opal_api::AdmissionContext;
    use opal_types::app::{
        AccountId, Coin, Envelope, Fee, Msg, SignHeader, SignatureProof,
    };
    use std::sync::Arc;

    fn env(account: AccountId, nonce: u64, msgs: Vec<Msg>, fee: Fee) -> Envelope {
        Envelope {
            header: SignHeader {
                account_id: account,
                nonce,
                chain_id: ChainId(1),
            },
            msgs,
            fee,
            signature_proof: SignatureProof::default(),
        }
    }

    fn transfer(from: AccountId) -> Msg {
        Msg::Transfer {
            from,
            to: AccountId([2u8; 32]),
            amount: vec![Coin::new(NATIVE_DENOM, 1)],
        }
    }

    #[test]
    fn nonce_check_enforces_order_and_increments() {
        let account = AccountId([1u8; 32]);
        let mut state = MemState::new();
        state.set_sequence(&account, 4);
        let chain = AnteChain::new(vec![nonce_check()]);
        let ctx = AdmissionContext::new(Arc::new(state), 1);

        let stale = env(account, 3, vec![transfer(account)], Fee::default());
        assert!(matches!(
            chain.check(ctx.branch(), &stale, false),
            Err(TransactionError::NonceMismatch { expected: 4, got: 3 })
        ));

        let current = env(account, 4, vec![transfer(account)], Fee::default());
        let next_ctx = chain.check(ctx, &current, false).unwrap();

        // The increment is visible to the next check in the same context.
        let replay = env(account, 4, vec![transfer(account)], Fee::default());
        assert!(chain.check(next_ctx.branch(), &replay, false).is_err());
        let follow_up = env(account, 5, vec![transfer(account)], Fee::default());
        assert!(chain.check(next_ctx, &follow_up, false).is_ok());
    }

    #[test]
    fn fee_denom_check_rejects_foreign_fee() {
        let chain = AnteChain::new(vec![fee_denom_check()]);
        let ctx = AdmissionContext::new(Arc::new(MemState::new()), 1);
        let account = AccountId([1u8; 32]);

        let bad = env(
            account,
            0,
            vec![transfer(account)],
            Fee {
                amount: vec![Coin::new("uforeign", 10)],
                gas_limit: 100,
            },
        );
        assert!(matches!(
            chain.check(ctx.branch(), &bad, false),
            Err(TransactionError::Fee(_))
        ));
    }

    #[test]
    fn fee_forward_terminator_blocks_user_submission() {
        let chain = AnteChain::new(vec![fee_forward_terminator()]);
        let ctx = AdmissionContext::new(Arc::new(MemState::new()), 1);
        let account = AccountId([1u8; 32]);

        let tx = env(
            account,
            0,
            vec![Msg::ForwardProtocolFees],
            Fee {
                amount: vec![Coin::new(NATIVE_DENOM, 100)],
                gas_limit: 50_000,
            },
        );

        // Pool-side check rejects it outright.
        assert!(matches!(
            chain.check(ctx.branch(), &tx, true),
            Err(TransactionError::UnauthorizedMessage(_))
        ));
        // Proposal replay allows a well-formed one.
        assert!(chain.check(ctx.branch(), &tx, false).is_ok());

        // But not one with a foreign fee denom.
        let bad = env(
            account,
            0,
            vec![Msg::ForwardProtocolFees],
            Fee {
                amount: vec![Coin::new("uforeign", 100)],
                gas_limit: 50_000,
            },
        );
        assert!(chain.check(ctx, &bad, false).is_err());
    }
}
