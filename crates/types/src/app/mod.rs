// Path: crates/types/src/app/mod.rs

//! Core application-level data structures: addresses, coins, messages and
//! the canonical transaction envelope.

/// Blob-carrying transactions, namespaces and the share commitment.
pub mod blob;

pub use blob::{
    decode_blob_tx, encode_blob_tx, is_blob_tx, share_commitment, Blob, BlobTx, Namespace,
};

use crate::consts::{
    ADDRESS_DISPLAY_PREFIX, BURN_MODULE_NAME, FEE_MODULE_NAME, MODULE_ADDRESS_TAG,
};
use crate::error::CoreError;
use dcrypt::algorithms::hash::sha2::Sha256 as DcryptSha256;
use dcrypt::algorithms::hash::HashFunction as DcryptHashFunction;
use dcrypt::algorithms::ByteSerializable;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// A fixed-size, 32-byte content hash of a transaction's raw wire bytes.
pub type TxHash = [u8; 32];

/// Computes the canonical SHA-256 digest of a byte string.
pub fn sha256(bytes: &[u8]) -> Result<[u8; 32], CoreError> {
    let digest = DcryptSha256::digest(bytes).map_err(|e| CoreError::Crypto(e.to_string()))?;
    let hash_bytes = digest.to_bytes();
    hash_bytes
        .try_into()
        .map_err(|_| CoreError::Crypto("invalid digest length".into()))
}

/// The stable 32-byte identifier of an account.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
    Encode, Decode,
)]
pub struct AccountId(pub [u8; 32]);

impl AsRef<[u8]> for AccountId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Derives the deterministic account address of a named protocol module.
///
/// The derivation is part of the consensus contract: every node must agree
/// on where module balances live.
pub fn module_address(name: &str) -> AccountId {
    let preimage = [MODULE_ADDRESS_TAG, name.as_bytes()].concat();
    // Module addresses are derived from compile-time constants; SHA-256
    // cannot fail on them.
    AccountId(sha256(&preimage).unwrap_or([0u8; 32]))
}

/// The module account that accrues protocol fees.
pub fn fee_address() -> AccountId {
    module_address(FEE_MODULE_NAME)
}

/// The module account whose balance is burned each block.
pub fn burn_address() -> AccountId {
    module_address(BURN_MODULE_NAME)
}

/// Renders an account id in its human-readable display form, as used for
/// packet receivers and operator-facing logs.
pub fn display_address(id: &AccountId) -> String {
    format!("{}{}", ADDRESS_DISPLAY_PREFIX, hex::encode(id.0))
}

/// The ID of the target chain, embedded in every signed header to prevent
/// cross-chain replays.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode,
)]
pub struct ChainId(pub u32);

/// A single denomination amount.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Coin {
    /// The denomination string, e.g. `"uopal"`.
    pub denom: String,
    /// The amount in base units.
    pub amount: u128,
}

impl Coin {
    /// Creates a new coin.
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }
}

/// The header containing all data required for a valid, replay-protected
/// signature.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default, Encode, Decode)]
pub struct SignHeader {
    /// The stable identifier of the signing account.
    pub account_id: AccountId,
    /// The per-account transaction nonce for replay protection.
    pub nonce: u64,
    /// The ID of the target chain.
    pub chain_id: ChainId,
}

/// A generic structure holding the signature and related data.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default, Encode, Decode)]
pub struct SignatureProof {
    /// The full public key of the signer.
    pub public_key: Vec<u8>,
    /// The cryptographic signature.
    pub signature: Vec<u8>,
}

/// The fee declaration of a transaction.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default, Encode, Decode)]
pub struct Fee {
    /// The coins offered as the transaction fee.
    pub amount: Vec<Coin>,
    /// The gas limit the transaction may consume.
    pub gas_limit: u64,
}

/// A message paying for the inclusion of one or more blobs in the block.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct PayForBlobs {
    /// The account paying for inclusion.
    pub signer: AccountId,
    /// The namespace of each blob, in blob order.
    pub namespaces: Vec<Namespace>,
    /// The declared byte length of each blob, in blob order.
    pub blob_sizes: Vec<u32>,
    /// The share commitment binding each blob's exact content, in blob order.
    pub share_commitments: Vec<[u8; 32]>,
}

/// The closed set of message kinds the admission core inspects.
///
/// The ledger understands more message types than these; the admission
/// pipeline only ever dispatches on the kinds below, so the enum stays
/// closed (no open-ended reflection).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum Msg {
    /// A value transfer between two accounts.
    Transfer {
        /// The sending account.
        from: AccountId,
        /// The receiving account.
        to: AccountId,
        /// The coins transferred.
        amount: Vec<Coin>,
    },
    /// A payment for blob inclusion.
    PayForBlobs(PayForBlobs),
    /// The synthesized protocol-fee forwarding message. Carries no fields:
    /// the fee amount and gas are derived from committed state and the
    /// consensus constant, never from message content.
    ForwardProtocolFees,
}

/// The canonical wire transaction.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Envelope {
    /// The signed header (account, nonce, chain id).
    pub header: SignHeader,
    /// The ordered list of messages.
    pub msgs: Vec<Msg>,
    /// The declared fee and gas limit.
    pub fee: Fee,
    /// The signature over the canonical body bytes.
    pub signature_proof: SignatureProof,
}

impl Envelope {
    /// Computes the canonical SHA-256 hash of the transaction.
    pub fn hash(&self) -> Result<TxHash, CoreError> {
        let bytes = crate::codec::to_bytes_canonical(self).map_err(CoreError::Codec)?;
        sha256(&bytes)
    }

    /// Encodes the envelope into its canonical wire bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CoreError> {
        crate::codec::to_bytes_canonical(self).map_err(CoreError::Codec)
    }

    /// Decodes an envelope from canonical wire bytes.
    pub fn from_bytes(raw: &[u8]) -> Result<Self, CoreError> {
        crate::codec::from_bytes_canonical(raw).map_err(CoreError::Codec)
    }

    /// Returns the first `PayForBlobs` message, if any.
    pub fn pay_for_blobs(&self) -> Option<&PayForBlobs> {
        self.msgs.iter().find_map(|m| match m {
            Msg::PayForBlobs(pfb) => Some(pfb),
            _ => None,
        })
    }

    /// Returns `true` if any message is the protocol-fee forwarding message.
    pub fn has_fee_forward(&self) -> bool {
        self.msgs
            .iter()
            .any(|m| matches!(m, Msg::ForwardProtocolFees))
    }
}

/// A candidate transaction as seen by the admission pipeline: either a
/// plain transaction's raw wire bytes, or a decoded blob transaction.
///
/// Candidates are moved between pipeline stages, never copied, so the
/// decode cost is paid once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateTx {
    /// An ordinary transaction, kept in wire form until admission.
    Plain(Vec<u8>),
    /// A blob-carrying transaction, decoded from its wire wrapper.
    Blob(BlobTx),
}

impl CandidateTx {
    /// Classifies raw pool/proposal bytes into a candidate.
    ///
    /// Bytes carrying the blob wrapper marker that fail to decode yield an
    /// error; anything else is treated as a plain transaction whose
    /// decoding is deferred to the admission stage.
    pub fn classify(raw: Vec<u8>) -> Result<Self, CoreError> {
        if is_blob_tx(&raw) {
            let btx = decode_blob_tx(&raw)?;
            Ok(CandidateTx::Blob(btx))
        } else {
            Ok(CandidateTx::Plain(raw))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::NATIVE_DENOM;

    fn sample_envelope() -> Envelope {
        Envelope {
            header: SignHeader {
                account_id: AccountId([7u8; 32]),
                nonce: 3,
                chain_id: ChainId(1),
            },
            msgs: vec![Msg::Transfer {
                from: AccountId([7u8; 32]),
                to: AccountId([9u8; 32]),
                amount: vec![Coin::new(NATIVE_DENOM, 1_000)],
            }],
            fee: Fee {
                amount: vec![Coin::new(NATIVE_DENOM, 10)],
                gas_limit: 100_000,
            },
            signature_proof: SignatureProof::default(),
        }
    }

    #[test]
    fn module_addresses_are_deterministic_and_distinct() {
        assert_eq!(fee_address(), fee_address());
        assert_eq!(burn_address(), burn_address());
        assert_ne!(fee_address(), burn_address());
    }

    #[test]
    fn display_address_is_prefixed_hex() {
        let addr = display_address(&AccountId([0xab; 32]));
        assert!(addr.starts_with(ADDRESS_DISPLAY_PREFIX));
        assert!(addr.ends_with("abab"));
    }

    #[test]
    fn envelope_roundtrip_and_stable_hash() {
        let env = sample_envelope();
        let bytes = env.to_bytes().unwrap();
        let decoded = Envelope::from_bytes(&bytes).unwrap();
        assert_eq!(env, decoded);
        assert_eq!(env.hash().unwrap(), decoded.hash().unwrap());

        let mut other = env.clone();
        other.header.nonce += 1;
        assert_ne!(env.hash().unwrap(), other.hash().unwrap());
    }

    #[test]
    fn classify_routes_plain_bytes_to_plain() {
        let env = sample_envelope();
        let raw = env.to_bytes().unwrap();
        match CandidateTx::classify(raw.clone()).unwrap() {
            CandidateTx::Plain(bytes) => assert_eq!(bytes, raw),
            other => panic!("expected plain candidate, got {:?}", other),
        }
    }
}
