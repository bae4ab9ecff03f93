// Path: crates/api/src/lib.rs

//! Core capability traits for the Opal admission and proposal kernel.
//!
//! The pipeline in `opal-proposal` is written entirely against the
//! contracts defined here: a key-value state capability, a branchable
//! admission context, an ordered chain of admission checks, and the opaque
//! square-assembler capability. Concrete ledgers and share codecs plug in
//! behind these seams.

/// Composition of ordered admission checks.
pub mod admission;
/// The branchable, commit-or-discard admission context.
pub mod context;
/// State access and account query capabilities.
pub mod state;
/// The opaque square-assembler capability.
pub mod square;
/// In-memory capability implementations for tests.
pub mod test_utils;

pub use admission::{AdmissionCheck, AnteChain};
pub use context::AdmissionContext;
pub use square::{Square, SquareAssembler};
pub use state::{read_balance, read_sequence, AccountQuery, StateAccess};
