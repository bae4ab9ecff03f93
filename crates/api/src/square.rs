// Path: crates/api/src/square.rs
//! The opaque square-assembler capability.
//!
//! The share-splitting and commitment-root math live behind this trait.
//! The admission filter only needs tentative appends, exact single-step
//! reverts, and a final export; a `false` append means "would not fit" and
//! is never an error.

use opal_types::app::BlobTx;
use opal_types::error::SquareError;

/// The exported contents of an assembled square.
///
/// Consumers treat this as opaque; the admission core only asserts which
/// units made it in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Square {
    /// The plain transactions, in admission order.
    pub txs: Vec<Vec<u8>>,
    /// The blob transactions, in admission order.
    pub blob_txs: Vec<BlobTx>,
}

/// Tentative, revertible assembly of a block's data square.
pub trait SquareAssembler {
    /// Attempts to allocate a plain transaction. Returns `false` if there
    /// is no room left for it.
    fn append_tx(&mut self, tx: &[u8]) -> bool;

    /// Attempts to allocate a blob transaction and its payloads as one
    /// unit. Returns `false` if the unit would not fit.
    fn append_blob_tx(&mut self, btx: &BlobTx) -> bool;

    /// Reverts exactly the most recent successful `append_tx`.
    fn revert_last_tx(&mut self) -> Result<(), SquareError>;

    /// Reverts exactly the most recent successful `append_blob_tx`.
    fn revert_last_blob_tx(&mut self) -> Result<(), SquareError>;

    /// Constructs the final square from everything currently appended.
    fn export(&self) -> Result<Square, SquareError>;
}
