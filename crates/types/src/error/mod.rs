// Path: crates/types/src/error/mod.rs
//! Core error types for the Opal kernel.

use thiserror::Error;

/// A trait for assigning a stable, machine-readable string code to an error.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// Low-level errors from the codec and hashing primitives.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Canonical encoding or decoding failed.
    #[error("Codec error: {0}")]
    Codec(String),
    /// A cryptographic primitive failed.
    #[error("Crypto error: {0}")]
    Crypto(String),
}

impl ErrorCode for CoreError {
    fn code(&self) -> &'static str {
        match self {
            Self::Codec(_) => "CORE_CODEC_ERROR",
            Self::Crypto(_) => "CORE_CRYPTO_ERROR",
        }
    }
}

/// Errors related to the state capability.
#[derive(Error, Debug)]
pub enum StateError {
    /// The requested key was not found in the state.
    #[error("Key not found in state")]
    KeyNotFound,
    /// An error occurred in the state backend.
    #[error("State backend error: {0}")]
    Backend(String),
    /// An error occurred during state value deserialization.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl ErrorCode for StateError {
    fn code(&self) -> &'static str {
        match self {
            Self::KeyNotFound => "STATE_KEY_NOT_FOUND",
            Self::Backend(_) => "STATE_BACKEND_ERROR",
            Self::Decode(_) => "STATE_DECODE_ERROR",
        }
    }
}

/// Per-candidate errors raised by the admission checks.
///
/// These are always locally recoverable: the candidate is dropped from the
/// kept set and processing continues.
#[derive(Error, Debug)]
pub enum TransactionError {
    /// Malformed wire bytes for an individual candidate.
    #[error("Failed to decode transaction: {0}")]
    Decode(String),
    /// The transaction exceeds the per-transaction wire-size cap.
    #[error("Transaction size {size} exceeds the maximum of {max} bytes")]
    Oversized {
        /// The wire size of the offending transaction.
        size: usize,
        /// The consensus size cap.
        max: usize,
    },
    /// The transaction nonce does not match the account's next sequence.
    #[error("Nonce mismatch: expected {expected}, got {got}")]
    NonceMismatch {
        /// The account's next expected sequence.
        expected: u64,
        /// The nonce carried by the transaction.
        got: u64,
    },
    /// The declared fee does not satisfy the admission rules.
    #[error("Insufficient or malformed fee: {0}")]
    Fee(String),
    /// A message kind that users may not submit directly.
    #[error("Unauthorized message: {0}")]
    UnauthorizedMessage(String),
    /// A generic, unspecified admission failure.
    #[error("Invalid transaction: {0}")]
    Invalid(String),
    /// The candidate is a blob transaction that failed blob validation.
    #[error(transparent)]
    Blob(#[from] BlobError),
    /// The admission check could not read the state it depends on.
    #[error(transparent)]
    State(#[from] StateError),
}

impl ErrorCode for TransactionError {
    fn code(&self) -> &'static str {
        match self {
            Self::Decode(_) => "TX_DECODE_FAILED",
            Self::Oversized { .. } => "TX_OVERSIZED",
            Self::NonceMismatch { .. } => "TX_NONCE_MISMATCH",
            Self::Fee(_) => "TX_FEE_INVALID",
            Self::UnauthorizedMessage(_) => "TX_UNAUTHORIZED_MESSAGE",
            Self::Invalid(_) => "TX_INVALID",
            Self::Blob(_) => "TX_BLOB_INVALID",
            Self::State(_) => "TX_STATE_ERROR",
        }
    }
}

/// Errors raised while validating a blob transaction.
#[derive(Error, Debug)]
pub enum BlobError {
    /// The inner envelope could not be decoded.
    #[error("Failed to decode inner transaction: {0}")]
    Decode(String),
    /// A blob transaction must carry exactly one message.
    #[error("Blob transaction carries {0} messages, expected exactly one")]
    MultipleMessages(usize),
    /// The single message is not a pay-for-blobs message.
    #[error("Blob transaction does not pay for blobs")]
    NoPayForBlobs,
    /// The pay-for-blobs tables are internally inconsistent.
    #[error("Malformed pay-for-blobs message: {0}")]
    Malformed(String),
    /// The number of attached blobs differs from the declared count.
    #[error("Declared {declared} blobs but {actual} are attached")]
    BlobCountMismatch {
        /// The count declared by the paying message.
        declared: usize,
        /// The number of attached payloads.
        actual: usize,
    },
    /// A blob payload is empty.
    #[error("Blob payload is empty")]
    ZeroBlobSize,
    /// The blob's share version is not supported.
    #[error("Unsupported share version {0}")]
    UnsupportedShareVersion(u8),
    /// The blob's namespace is structurally invalid.
    #[error("Invalid namespace: {0}")]
    InvalidNamespace(String),
    /// The blob's namespace is reserved for protocol use.
    #[error("Namespace is reserved for protocol use")]
    ReservedNamespace,
    /// A declared blob size differs from the attached payload.
    #[error("Blob {index}: declared size {declared} but payload is {actual} bytes")]
    SizeMismatch {
        /// The blob's position in the transaction.
        index: usize,
        /// The size declared by the paying message.
        declared: u32,
        /// The actual payload size.
        actual: u32,
    },
    /// A declared namespace differs from the attached payload's namespace.
    #[error("Blob {index}: namespace does not match the paying message")]
    NamespaceMismatch {
        /// The blob's position in the transaction.
        index: usize,
    },
    /// The recomputed share commitment differs from the declared one.
    #[error("Blob {index}: share commitment does not match the payload")]
    CommitmentMismatch {
        /// The blob's position in the transaction.
        index: usize,
    },
    /// The commitment arithmetic itself failed.
    #[error("Failed to compute share commitment: {0}")]
    Commitment(String),
}

impl ErrorCode for BlobError {
    fn code(&self) -> &'static str {
        match self {
            Self::Decode(_) => "BLOB_DECODE_FAILED",
            Self::MultipleMessages(_) => "BLOB_MULTIPLE_MESSAGES",
            Self::NoPayForBlobs => "BLOB_NO_PFB",
            Self::Malformed(_) => "BLOB_MALFORMED_PFB",
            Self::BlobCountMismatch { .. } => "BLOB_COUNT_MISMATCH",
            Self::ZeroBlobSize => "BLOB_ZERO_SIZE",
            Self::UnsupportedShareVersion(_) => "BLOB_BAD_SHARE_VERSION",
            Self::InvalidNamespace(_) => "BLOB_BAD_NAMESPACE",
            Self::ReservedNamespace => "BLOB_RESERVED_NAMESPACE",
            Self::SizeMismatch { .. } => "BLOB_SIZE_MISMATCH",
            Self::NamespaceMismatch { .. } => "BLOB_NAMESPACE_MISMATCH",
            Self::CommitmentMismatch { .. } => "BLOB_COMMITMENT_MISMATCH",
            Self::Commitment(_) => "BLOB_COMMITMENT_FAILED",
        }
    }
}

/// Errors reported by the square-assembler capability.
///
/// A `false` append is not an error (the unit simply would not fit); these
/// cover genuine capability failures.
#[derive(Error, Debug)]
pub enum SquareError {
    /// Reverting the most recent append failed.
    #[error("Failed to revert last append: {0}")]
    Revert(String),
    /// Exporting the square failed.
    #[error("Failed to export square: {0}")]
    Export(String),
}

impl ErrorCode for SquareError {
    fn code(&self) -> &'static str {
        match self {
            Self::Revert(_) => "SQUARE_REVERT_FAILED",
            Self::Export(_) => "SQUARE_EXPORT_FAILED",
        }
    }
}

/// Whole-proposal rejection reasons.
///
/// Unlike `TransactionError`, none of these are recoverable at the
/// single-transaction level: any of them rejects the entire proposal.
#[derive(Error, Debug)]
pub enum ProposalError {
    /// A transaction exceeds the consensus wire-size cap.
    #[error("Transaction {index} is {size} bytes, larger than the maximum of {max}")]
    OversizedTx {
        /// The transaction's position in the proposal.
        index: usize,
        /// The transaction's wire size.
        size: usize,
        /// The consensus size cap.
        max: usize,
    },
    /// A transaction in the proposal is not decodable.
    #[error("Transaction {index} is not decodable")]
    UndecodableTx {
        /// The transaction's position in the proposal.
        index: usize,
    },
    /// A plain transaction carries a pay-for-blobs message.
    #[error("Transaction {index} pays for blobs but is not a blob transaction")]
    PfbInPlainTx {
        /// The transaction's position in the proposal.
        index: usize,
    },
    /// A blob transaction in the proposal failed validation.
    #[error("Blob transaction {index} is invalid: {source}")]
    BlobInvalid {
        /// The transaction's position in the proposal.
        index: usize,
        /// The underlying blob validation failure.
        source: BlobError,
    },
    /// A transaction in the proposal failed the admission check replay.
    #[error("Transaction {index} failed admission: {source}")]
    AdmissionFailed {
        /// The transaction's position in the proposal.
        index: usize,
        /// The underlying admission failure.
        source: TransactionError,
    },
    /// The fee module holds a balance but the proposal carries no
    /// protocol-fee transaction in first position.
    #[error("Fee module holds a balance but the proposal has no protocol-fee transaction")]
    MissingFeeTransaction,
    /// The fee module holds no balance but a protocol-fee transaction is present.
    #[error("Protocol-fee transaction present but the fee module holds no balance")]
    UnexpectedFeeTransaction,
    /// The proposal's fee transaction deviates from the derived one.
    #[error("Protocol-fee transaction mismatch: {0}")]
    FeeTransactionMismatch(String),
    /// The re-filled square could not be exported.
    #[error("Failed to reconstruct the proposal square: {0}")]
    SquareExport(String),
    /// An invariant that upstream guarantees should make unreachable was
    /// violated; the proposal attempt is aborted.
    #[error("Internal invariant violation: {0}")]
    Internal(String),
}

impl ErrorCode for ProposalError {
    fn code(&self) -> &'static str {
        match self {
            Self::OversizedTx { .. } => "PROPOSAL_TX_OVERSIZED",
            Self::UndecodableTx { .. } => "PROPOSAL_TX_UNDECODABLE",
            Self::PfbInPlainTx { .. } => "PROPOSAL_PFB_IN_PLAIN_TX",
            Self::BlobInvalid { .. } => "PROPOSAL_BLOB_INVALID",
            Self::AdmissionFailed { .. } => "PROPOSAL_ADMISSION_FAILED",
            Self::MissingFeeTransaction => "PROPOSAL_FEE_TX_MISSING",
            Self::UnexpectedFeeTransaction => "PROPOSAL_FEE_TX_UNEXPECTED",
            Self::FeeTransactionMismatch(_) => "PROPOSAL_FEE_TX_MISMATCH",
            Self::SquareExport(_) => "PROPOSAL_SQUARE_EXPORT_FAILED",
            Self::Internal(_) => "PROPOSAL_INTERNAL_INVARIANT",
        }
    }
}

/// Errors raised by the inbound transfer guard.
#[derive(Error, Debug)]
pub enum GuardError {
    /// A non-native asset was sent to a protected module address.
    #[error(
        "only {native} can be sent to the protected address, got {denom} (base denom: {base})"
    )]
    NonNativeAsset {
        /// The network's native denomination.
        native: String,
        /// The full, possibly hop-prefixed denomination from the packet.
        denom: String,
        /// The base denomination after stripping hop prefixes.
        base: String,
    },
}

impl ErrorCode for GuardError {
    fn code(&self) -> &'static str {
        match self {
            Self::NonNativeAsset { .. } => "GUARD_NON_NATIVE_ASSET",
        }
    }
}
