// Path: crates/types/src/app/blob.rs

//! Blob-carrying transactions, namespaces and the share commitment.
//!
//! A blob transaction is an ordinary envelope paired with the opaque blob
//! payloads it pays for, carried on the wire inside a marked wrapper so
//! that nodes can separate the two transaction shapes without decoding the
//! inner envelope.

use crate::codec;
use crate::consts::SHARE_SIZE;
use crate::error::{BlobError, CoreError};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// The number of leading zero bytes required in a version-zero namespace id.
pub const NAMESPACE_VERSION_ZERO_PREFIX: usize = 18;

/// The byte length of a namespace id.
pub const NAMESPACE_ID_SIZE: usize = 28;

/// The only share version currently defined.
pub const SHARE_VERSION_ZERO: u8 = 0;

/// The 4-byte wire marker identifying a blob transaction wrapper.
const BLOB_TX_MARKER: [u8; 4] = *b"BLOB";

/// A blob namespace: a version byte plus a 28-byte identifier.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Encode,
    Decode,
)]
pub struct Namespace {
    /// The namespace version. Only version zero is currently valid.
    pub version: u8,
    /// The namespace identifier.
    pub id: [u8; NAMESPACE_ID_SIZE],
}

impl Namespace {
    /// Creates a validated version-zero namespace from its user-chosen suffix.
    pub fn new_v0(suffix: &[u8]) -> Result<Self, BlobError> {
        if suffix.len() > NAMESPACE_ID_SIZE - NAMESPACE_VERSION_ZERO_PREFIX {
            return Err(BlobError::InvalidNamespace(format!(
                "version-zero namespace suffix too long: {} bytes",
                suffix.len()
            )));
        }
        let mut id = [0u8; NAMESPACE_ID_SIZE];
        id[NAMESPACE_ID_SIZE - suffix.len()..].copy_from_slice(suffix);
        let ns = Self { version: 0, id };
        ns.validate_for_blob()?;
        Ok(ns)
    }

    /// Returns the canonical 29-byte encoding of the namespace.
    pub fn to_bytes(self) -> [u8; NAMESPACE_ID_SIZE + 1] {
        let mut out = [0u8; NAMESPACE_ID_SIZE + 1];
        out[0] = self.version;
        out[1..].copy_from_slice(&self.id);
        out
    }

    /// Returns `true` if the namespace is reserved for protocol use.
    pub fn is_reserved(&self) -> bool {
        self.id.iter().all(|b| *b == 0)
    }

    /// Validates that this namespace may be used by a user blob.
    pub fn validate_for_blob(&self) -> Result<(), BlobError> {
        if self.version != 0 {
            return Err(BlobError::InvalidNamespace(format!(
                "unsupported namespace version {}",
                self.version
            )));
        }
        if self.id[..NAMESPACE_VERSION_ZERO_PREFIX].iter().any(|b| *b != 0) {
            return Err(BlobError::InvalidNamespace(
                "version-zero namespace id must have a zeroed prefix".into(),
            ));
        }
        if self.is_reserved() {
            return Err(BlobError::ReservedNamespace);
        }
        Ok(())
    }
}

/// Opaque application data attached to a transaction for inclusion in a
/// block without being interpreted by the ledger state machine.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Blob {
    /// The namespace the blob is published under.
    pub namespace: Namespace,
    /// The opaque payload.
    pub data: Vec<u8>,
    /// The share encoding version of the payload.
    pub share_version: u8,
}

impl Blob {
    /// Creates a new blob after performing basic stateless checks over it.
    pub fn new(namespace: Namespace, data: Vec<u8>, share_version: u8) -> Result<Self, BlobError> {
        namespace.validate_for_blob()?;
        if data.is_empty() {
            return Err(BlobError::ZeroBlobSize);
        }
        if share_version != SHARE_VERSION_ZERO {
            return Err(BlobError::UnsupportedShareVersion(share_version));
        }
        Ok(Self {
            namespace,
            data,
            share_version,
        })
    }

    /// Re-validates the stateless blob invariants.
    pub fn validate(&self) -> Result<(), BlobError> {
        self.namespace.validate_for_blob()?;
        if self.data.is_empty() {
            return Err(BlobError::ZeroBlobSize);
        }
        if self.share_version != SHARE_VERSION_ZERO {
            return Err(BlobError::UnsupportedShareVersion(self.share_version));
        }
        Ok(())
    }
}

/// A decoded blob transaction: the inner envelope bytes plus the ordered
/// blob payloads it pays for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobTx {
    /// The canonical wire bytes of the inner envelope.
    pub tx: Vec<u8>,
    /// The blob payloads, in `PayForBlobs` order.
    pub blobs: Vec<Blob>,
}

/// The wire wrapper separating blob transactions from plain ones.
#[derive(Encode, Decode)]
struct BlobTxWrapper {
    marker: [u8; 4],
    tx: Vec<u8>,
    blobs: Vec<Blob>,
}

/// Returns `true` if the raw bytes carry the blob transaction marker.
pub fn is_blob_tx(raw: &[u8]) -> bool {
    raw.starts_with(&BLOB_TX_MARKER)
}

/// Encodes a blob transaction into its canonical wire form.
pub fn encode_blob_tx(btx: &BlobTx) -> Result<Vec<u8>, CoreError> {
    let wrapper = BlobTxWrapper {
        marker: BLOB_TX_MARKER,
        tx: btx.tx.clone(),
        blobs: btx.blobs.clone(),
    };
    codec::to_bytes_canonical(&wrapper).map_err(CoreError::Codec)
}

/// Decodes a blob transaction from its canonical wire form.
///
/// Callers should gate on [`is_blob_tx`] first; bytes without the marker
/// fail here with a codec error.
pub fn decode_blob_tx(raw: &[u8]) -> Result<BlobTx, CoreError> {
    let wrapper: BlobTxWrapper =
        codec::from_bytes_canonical(raw).map_err(CoreError::Codec)?;
    if wrapper.marker != BLOB_TX_MARKER {
        return Err(CoreError::Codec("missing blob transaction marker".into()));
    }
    Ok(BlobTx {
        tx: wrapper.tx,
        blobs: wrapper.blobs,
    })
}

/// Computes the share commitment binding a blob's exact content.
///
/// The payload is split into `SHARE_SIZE`-byte chunks; each chunk is hashed
/// into a leaf domain-tagged with the blob's namespace and share version,
/// and the leaves are folded into a binary Merkle root. The full namespaced
/// square layout is computed elsewhere; this digest is what the paying
/// message commits to.
pub fn share_commitment(blob: &Blob) -> Result<[u8; 32], BlobError> {
    if blob.data.is_empty() {
        return Err(BlobError::ZeroBlobSize);
    }

    let ns = blob.namespace.to_bytes();
    let mut level: Vec<[u8; 32]> = Vec::with_capacity(blob.data.len() / SHARE_SIZE + 1);
    for chunk in blob.data.chunks(SHARE_SIZE) {
        let mut preimage = Vec::with_capacity(1 + ns.len() + 1 + chunk.len());
        preimage.push(0x00);
        preimage.extend_from_slice(&ns);
        preimage.push(blob.share_version);
        preimage.extend_from_slice(chunk);
        let leaf = super::sha256(&preimage).map_err(|e| BlobError::Commitment(e.to_string()))?;
        level.push(leaf);
    }

    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len() / 2 + 1);
        for pair in level.chunks(2) {
            match pair {
                [left, right] => {
                    let mut preimage = Vec::with_capacity(1 + 64);
                    preimage.push(0x01);
                    preimage.extend_from_slice(left);
                    preimage.extend_from_slice(right);
                    let node = super::sha256(&preimage)
                        .map_err(|e| BlobError::Commitment(e.to_string()))?;
                    next.push(node);
                }
                [odd] => next.push(*odd),
                _ => unreachable!(),
            }
        }
        level = next;
    }

    // level is non-empty: data is non-empty so at least one leaf exists.
    Ok(level[0])
}

/// Performs the full structural validation of a blob transaction and then
/// verifies every share commitment.
///
/// The check order mirrors per-transaction admission: decodable inner
/// envelope, exactly one message which pays for blobs, valid blobs,
/// declared sizes and namespaces matching the attached payloads, and
/// finally commitment equality.
pub fn validate_blob_tx(btx: &BlobTx) -> Result<(), BlobError> {
    let envelope = super::Envelope::from_bytes(&btx.tx)
        .map_err(|e| BlobError::Decode(e.to_string()))?;

    if envelope.msgs.len() != 1 {
        return Err(BlobError::MultipleMessages(envelope.msgs.len()));
    }
    let pfb = match &envelope.msgs[0] {
        super::Msg::PayForBlobs(pfb) => pfb,
        _ => return Err(BlobError::NoPayForBlobs),
    };

    let n = pfb.namespaces.len();
    if n == 0 || pfb.blob_sizes.len() != n || pfb.share_commitments.len() != n {
        return Err(BlobError::Malformed(format!(
            "pay-for-blobs tables disagree: {} namespaces, {} sizes, {} commitments",
            n,
            pfb.blob_sizes.len(),
            pfb.share_commitments.len()
        )));
    }
    if btx.blobs.len() != n {
        return Err(BlobError::BlobCountMismatch {
            declared: n,
            actual: btx.blobs.len(),
        });
    }

    for blob in &btx.blobs {
        blob.validate()?;
    }

    for (i, blob) in btx.blobs.iter().enumerate() {
        if pfb.blob_sizes[i] as usize != blob.data.len() {
            return Err(BlobError::SizeMismatch {
                index: i,
                declared: pfb.blob_sizes[i],
                actual: blob.data.len() as u32,
            });
        }
        if pfb.namespaces[i] != blob.namespace {
            return Err(BlobError::NamespaceMismatch { index: i });
        }
    }

    verify_commitments(btx)
}

/// Recomputes every share commitment from the attached payloads and
/// compares against the values embedded in the paying message.
///
/// This is the arithmetic half of blob validation. It trusts the inner
/// envelope's structure only as far as locating the paying message; it is
/// the path that must run even when a cached outcome vouches for the
/// transaction's structure.
pub fn verify_commitments(btx: &BlobTx) -> Result<(), BlobError> {
    let envelope = super::Envelope::from_bytes(&btx.tx)
        .map_err(|e| BlobError::Decode(e.to_string()))?;
    let pfb = envelope.pay_for_blobs().ok_or(BlobError::NoPayForBlobs)?;

    if pfb.share_commitments.len() != btx.blobs.len() {
        return Err(BlobError::BlobCountMismatch {
            declared: pfb.share_commitments.len(),
            actual: btx.blobs.len(),
        });
    }

    for (i, blob) in btx.blobs.iter().enumerate() {
        let computed = share_commitment(blob)?;
        if computed != pfb.share_commitments[i] {
            return Err(BlobError::CommitmentMismatch { index: i });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{AccountId, ChainId, Envelope, Fee, Msg, PayForBlobs, SignHeader, SignatureProof};
    use crate::consts::NATIVE_DENOM;

    fn namespace(b: u8) -> Namespace {
        Namespace::new_v0(&[b; 8]).unwrap()
    }

    fn blob_tx(ns: Namespace, data: Vec<u8>) -> BlobTx {
        let blob = Blob::new(ns, data, SHARE_VERSION_ZERO).unwrap();
        let commitment = share_commitment(&blob).unwrap();
        let envelope = Envelope {
            header: SignHeader {
                account_id: AccountId([1u8; 32]),
                nonce: 0,
                chain_id: ChainId(1),
            },
            msgs: vec![Msg::PayForBlobs(PayForBlobs {
                signer: AccountId([1u8; 32]),
                namespaces: vec![ns],
                blob_sizes: vec![blob.data.len() as u32],
                share_commitments: vec![commitment],
            })],
            fee: Fee {
                amount: vec![crate::app::Coin::new(NATIVE_DENOM, 100)],
                gas_limit: 100_000,
            },
            signature_proof: SignatureProof::default(),
        };
        BlobTx {
            tx: envelope.to_bytes().unwrap(),
            blobs: vec![blob],
        }
    }

    #[test]
    fn namespace_rules() {
        assert!(Namespace::new_v0(&[1, 2, 3]).is_ok());
        // Reserved (all-zero) namespaces are rejected.
        assert!(matches!(
            Namespace::new_v0(&[]),
            Err(BlobError::ReservedNamespace)
        ));
        // A dirty prefix is rejected.
        let mut id = [0u8; NAMESPACE_ID_SIZE];
        id[0] = 1;
        let ns = Namespace { version: 0, id };
        assert!(ns.validate_for_blob().is_err());
        // Only version zero is valid.
        let ns = Namespace { version: 1, id: [1u8; NAMESPACE_ID_SIZE] };
        assert!(ns.validate_for_blob().is_err());
    }

    #[test]
    fn wire_roundtrip_and_marker() {
        let btx = blob_tx(namespace(3), vec![0xaa; 1500]);
        let raw = encode_blob_tx(&btx).unwrap();
        assert!(is_blob_tx(&raw));
        let decoded = decode_blob_tx(&raw).unwrap();
        assert_eq!(btx, decoded);

        assert!(!is_blob_tx(&btx.tx));
        assert!(decode_blob_tx(&btx.tx).is_err());
    }

    #[test]
    fn commitment_is_deterministic_and_content_bound() {
        let blob = Blob::new(namespace(5), vec![1u8; 2000], SHARE_VERSION_ZERO).unwrap();
        let c1 = share_commitment(&blob).unwrap();
        let c2 = share_commitment(&blob).unwrap();
        assert_eq!(c1, c2);

        let mut tampered = blob.clone();
        tampered.data[0] ^= 0xff;
        assert_ne!(c1, share_commitment(&tampered).unwrap());

        let mut moved = blob.clone();
        moved.namespace = namespace(6);
        assert_ne!(c1, share_commitment(&moved).unwrap());
    }

    #[test]
    fn validate_accepts_well_formed_blob_tx() {
        let btx = blob_tx(namespace(2), vec![9u8; 600]);
        assert!(validate_blob_tx(&btx).is_ok());
    }

    #[test]
    fn validate_rejects_namespace_mismatch() {
        let mut btx = blob_tx(namespace(2), vec![9u8; 600]);
        btx.blobs[0].namespace = namespace(4);
        assert!(matches!(
            validate_blob_tx(&btx),
            Err(BlobError::NamespaceMismatch { index: 0 })
        ));
    }

    #[test]
    fn validate_rejects_size_mismatch() {
        let mut btx = blob_tx(namespace(2), vec![9u8; 600]);
        btx.blobs[0].data.push(0);
        assert!(matches!(
            validate_blob_tx(&btx),
            Err(BlobError::SizeMismatch { index: 0, .. })
        ));
    }

    #[test]
    fn validate_rejects_tampered_payload() {
        let mut btx = blob_tx(namespace(2), vec![9u8; 600]);
        btx.blobs[0].data[10] ^= 0x01;
        assert!(matches!(
            validate_blob_tx(&btx),
            Err(BlobError::CommitmentMismatch { index: 0 })
        ));
    }

    #[test]
    fn validate_rejects_non_pfb_message() {
        let mut btx = blob_tx(namespace(2), vec![9u8; 600]);
        let mut envelope = Envelope::from_bytes(&btx.tx).unwrap();
        envelope.msgs = vec![Msg::ForwardProtocolFees];
        btx.tx = envelope.to_bytes().unwrap();
        assert!(matches!(validate_blob_tx(&btx), Err(BlobError::NoPayForBlobs)));
    }
}
