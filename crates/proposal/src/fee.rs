// Path: crates/proposal/src/fee.rs
//! The deterministic protocol-fee transaction.
//!
//! Every block must forward the fee module account's accrued balance to
//! the proposer, and must do so with a transaction every validator can
//! re-derive bit-for-bit from committed state. `prepare` and `validate`
//! are the two entry points and must be kept in lockstep: whatever
//! `prepare` would synthesize is exactly what `validate` demands.

use opal_api::AccountQuery;
use opal_types::app::{
    fee_address, ChainId, Coin, Envelope, Fee, Msg, SignHeader, SignatureProof,
};
use opal_types::consts::{FEE_FORWARD_GAS_LIMIT, NATIVE_DENOM};
use opal_types::error::{ProposalError, StateError};

/// Derives the protocol-fee transaction for the current committed state.
///
/// Returns `None` when the fee module account holds no native balance —
/// in that case the block must not contain a fee transaction at all.
pub fn prepare(
    query: &dyn AccountQuery,
    chain_id: ChainId,
) -> Result<Option<Envelope>, StateError> {
    let balance = query.get_balance(&fee_address(), NATIVE_DENOM)?;
    if balance == 0 {
        return Ok(None);
    }
    Ok(Some(Envelope {
        header: SignHeader {
            account_id: fee_address(),
            nonce: 0,
            chain_id,
        },
        msgs: vec![Msg::ForwardProtocolFees],
        fee: Fee {
            amount: vec![Coin::new(NATIVE_DENOM, balance)],
            gas_limit: FEE_FORWARD_GAS_LIMIT,
        },
        signature_proof: SignatureProof::default(),
    }))
}

/// Checks a received proposal against the locally derived fee transaction.
///
/// When no fee transaction is expected, none may appear anywhere in the
/// proposal. When one is expected, the proposal's first transaction must
/// match the derivation exactly: one fee-forward message, one fee coin
/// equal in denom and amount, and the fixed gas limit. Any deviation
/// rejects the whole proposal.
pub fn validate(
    query: &dyn AccountQuery,
    chain_id: ChainId,
    txs: &[Vec<u8>],
) -> Result<(), ProposalError> {
    let expected = prepare(query, chain_id)
        .map_err(|e| ProposalError::Internal(format!("reading fee module balance: {}", e)))?;

    let Some(expected) = expected else {
        for raw in txs {
            if let Ok(envelope) = Envelope::from_bytes(raw) {
                if envelope.has_fee_forward() {
                    return Err(ProposalError::UnexpectedFeeTransaction);
                }
            }
        }
        return Ok(());
    };

    let Some(first) = txs.first() else {
        return Err(ProposalError::MissingFeeTransaction);
    };
    let envelope =
        Envelope::from_bytes(first).map_err(|_| ProposalError::MissingFeeTransaction)?;
    if envelope.msgs.len() != 1 || !matches!(envelope.msgs[0], Msg::ForwardProtocolFees) {
        return Err(ProposalError::MissingFeeTransaction);
    }

    if envelope.fee.amount.len() != 1 {
        return Err(ProposalError::FeeTransactionMismatch(format!(
            "expected exactly one fee coin, got {}",
            envelope.fee.amount.len()
        )));
    }
    let coin = &envelope.fee.amount[0];
    let expected_coin = &expected.fee.amount[0];
    if coin.denom != expected_coin.denom {
        return Err(ProposalError::FeeTransactionMismatch(format!(
            "fee denom {} does not equal expected {}",
            coin.denom, expected_coin.denom
        )));
    }
    if coin.amount != expected_coin.amount {
        return Err(ProposalError::FeeTransactionMismatch(format!(
            "fee amount {} does not equal expected {}",
            coin.amount, expected_coin.amount
        )));
    }
    if envelope.fee.gas_limit != FEE_FORWARD_GAS_LIMIT {
        return Err(ProposalError::FeeTransactionMismatch(format!(
            "gas limit {} does not equal expected {}",
            envelope.fee.gas_limit, FEE_FORWARD_GAS_LIMIT
        )));
    }

    // Exactly one fee transaction, and only in first position.
    for raw in &txs[1..] {
        if let Ok(envelope) = Envelope::from_bytes(raw) {
            if envelope.has_fee_forward() {
                return Err(ProposalError::FeeTransactionMismatch(
                    "fee-forward message outside the first position".into(),
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::*;
    use opal_api::test_utils::MemState;
    use opal_types::app::fee_address;

    const CHAIN: ChainId = ChainId(1);

    fn funded_state(balance: u128) -> MemState {
        let mut state = MemState::new();
        state.set_balance(&fee_address(), NATIVE_DENOM, balance);
        state
    }

    #[test]
    fn prepare_derives_the_exact_balance_and_fixed_gas() {
        let state = funded_state(1_000_000);
        let tx = prepare(&state, CHAIN).unwrap().unwrap();

        assert_eq!(tx.msgs, vec![Msg::ForwardProtocolFees]);
        assert_eq!(tx.fee.amount, vec![Coin::new(NATIVE_DENOM, 1_000_000)]);
        assert_eq!(tx.fee.gas_limit, FEE_FORWARD_GAS_LIMIT);

        // Two derivations from the same state are byte-identical.
        let again = prepare(&state, CHAIN).unwrap().unwrap();
        assert_eq!(tx.to_bytes().unwrap(), again.to_bytes().unwrap());
    }

    #[test]
    fn prepare_returns_nothing_on_zero_balance() {
        let state = funded_state(0);
        assert!(prepare(&state, CHAIN).unwrap().is_none());
    }

    #[test]
    fn validate_accepts_the_derived_transaction() {
        let state = funded_state(1_000_000);
        let tx = prepare(&state, CHAIN).unwrap().unwrap().to_bytes().unwrap();
        assert!(validate(&state, CHAIN, &[tx]).is_ok());
    }

    #[test]
    fn validate_rejects_wrong_amount() {
        let state = funded_state(1_000_000);
        let tx = fee_forward_tx(CHAIN, NATIVE_DENOM, 500_000, FEE_FORWARD_GAS_LIMIT);
        assert!(matches!(
            validate(&state, CHAIN, &[tx]),
            Err(ProposalError::FeeTransactionMismatch(_))
        ));
    }

    #[test]
    fn validate_rejects_doubled_gas() {
        let state = funded_state(1_000_000);
        let tx = fee_forward_tx(CHAIN, NATIVE_DENOM, 1_000_000, FEE_FORWARD_GAS_LIMIT * 2);
        assert!(matches!(
            validate(&state, CHAIN, &[tx]),
            Err(ProposalError::FeeTransactionMismatch(_))
        ));
    }

    #[test]
    fn validate_rejects_wrong_denom() {
        let state = funded_state(1_000_000);
        let tx = fee_forward_tx(CHAIN, "uwrong", 1_000_000, FEE_FORWARD_GAS_LIMIT);
        assert!(matches!(
            validate(&state, CHAIN, &[tx]),
            Err(ProposalError::FeeTransactionMismatch(_))
        ));
    }

    #[test]
    fn validate_rejects_absence_when_balance_exists() {
        let state = funded_state(1_000_000);
        assert!(matches!(
            validate(&state, CHAIN, &[]),
            Err(ProposalError::MissingFeeTransaction)
        ));

        // A block of ordinary transactions without the fee tx first also fails.
        let ordinary = transfer_tx(opal_types::app::AccountId([5u8; 32]), 0);
        assert!(matches!(
            validate(&state, CHAIN, &[ordinary]),
            Err(ProposalError::MissingFeeTransaction)
        ));
    }

    #[test]
    fn validate_rejects_presence_on_zero_balance() {
        let state = funded_state(0);
        let tx = fee_forward_tx(CHAIN, NATIVE_DENOM, 1_000_000, FEE_FORWARD_GAS_LIMIT);
        assert!(matches!(
            validate(&state, CHAIN, &[tx]),
            Err(ProposalError::UnexpectedFeeTransaction)
        ));

        // And an empty proposal is fine.
        assert!(validate(&state, CHAIN, &[]).is_ok());
    }

    #[test]
    fn validate_rejects_fee_forward_outside_first_position() {
        let state = funded_state(1_000_000);
        let good = prepare(&state, CHAIN).unwrap().unwrap().to_bytes().unwrap();
        let dup = fee_forward_tx(CHAIN, NATIVE_DENOM, 1_000_000, FEE_FORWARD_GAS_LIMIT);
        assert!(matches!(
            validate(&state, CHAIN, &[good, dup]),
            Err(ProposalError::FeeTransactionMismatch(_))
        ));
    }
}
