// Path: crates/api/src/test_utils/mock_square.rs
//! A deterministic share-capacity square assembler for tests.

use crate::square::{Square, SquareAssembler};
use opal_types::app::BlobTx;
use opal_types::consts::SHARE_SIZE;
use opal_types::error::SquareError;

fn shares_for(len: usize) -> usize {
    len.div_ceil(SHARE_SIZE).max(1)
}

/// A square assembler with a fixed share budget.
///
/// Accounting is simplified relative to a real share codec (no namespace
/// padding, no subtree alignment) but preserves the contract the filter
/// relies on: appends are tentative, `false` means "would not fit", and a
/// revert releases exactly the most recent unit's allocation.
#[derive(Debug)]
pub struct CapacitySquare {
    capacity_shares: usize,
    used_shares: usize,
    txs: Vec<Vec<u8>>,
    tx_costs: Vec<usize>,
    blob_txs: Vec<BlobTx>,
    blob_costs: Vec<usize>,
}

impl CapacitySquare {
    /// Creates an assembler holding at most `capacity_shares` shares.
    pub fn new(capacity_shares: usize) -> Self {
        Self {
            capacity_shares,
            used_shares: 0,
            txs: Vec::new(),
            tx_costs: Vec::new(),
            blob_txs: Vec::new(),
            blob_costs: Vec::new(),
        }
    }

    /// The number of shares currently allocated.
    pub fn used_shares(&self) -> usize {
        self.used_shares
    }

    fn blob_tx_cost(btx: &BlobTx) -> usize {
        let mut cost = shares_for(btx.tx.len());
        for blob in &btx.blobs {
            cost += shares_for(blob.data.len());
        }
        cost
    }
}

impl SquareAssembler for CapacitySquare {
    fn append_tx(&mut self, tx: &[u8]) -> bool {
        let cost = shares_for(tx.len());
        if self.used_shares + cost > self.capacity_shares {
            return false;
        }
        self.used_shares += cost;
        self.txs.push(tx.to_vec());
        self.tx_costs.push(cost);
        true
    }

    fn append_blob_tx(&mut self, btx: &BlobTx) -> bool {
        let cost = Self::blob_tx_cost(btx);
        if self.used_shares + cost > self.capacity_shares {
            return false;
        }
        self.used_shares += cost;
        self.blob_txs.push(btx.clone());
        self.blob_costs.push(cost);
        true
    }

    fn revert_last_tx(&mut self) -> Result<(), SquareError> {
        let cost = self
            .tx_costs
            .pop()
            .ok_or_else(|| SquareError::Revert("no transaction to revert".into()))?;
        self.txs.pop();
        self.used_shares -= cost;
        Ok(())
    }

    fn revert_last_blob_tx(&mut self) -> Result<(), SquareError> {
        let cost = self
            .blob_costs
            .pop()
            .ok_or_else(|| SquareError::Revert("no blob transaction to revert".into()))?;
        self.blob_txs.pop();
        self.used_shares -= cost;
        Ok(())
    }

    fn export(&self) -> Result<Square, SquareError> {
        Ok(Square {
            txs: self.txs.clone(),
            blob_txs: self.blob_txs.clone(),
        })
    }
}
