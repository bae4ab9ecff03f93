// Path: crates/types/src/lib.rs

//! Core data structures and error types for the Opal kernel.
//!
//! Everything in this crate is consensus-critical: the wire encoding of
//! transactions, the consensus constants, and the share-commitment
//! arithmetic must be bit-identical on every node.

/// Core application-level data structures: transactions, blobs, addresses.
pub mod app;
/// The canonical, deterministic binary codec for consensus-critical data.
pub mod codec;
/// Consensus constants that must be identical across all nodes.
pub mod consts;
/// Core error types and the stable `ErrorCode` taxonomy.
pub mod error;
/// Constants for well-known state keys.
pub mod keys;
