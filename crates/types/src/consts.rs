// Path: crates/types/src/consts.rs

//! Consensus constants for the Opal network.
//!
//! Every constant in this module is part of the consensus contract: all
//! validators must agree on these values bit-for-bit or proposals produced
//! by one node will be rejected by the others.

/// The size of a single data share in bytes. Blob payloads are split into
/// chunks of this size before the share commitment is computed.
pub const SHARE_SIZE: usize = 512;

/// The maximum number of state-changing messages contributed by plain
/// (non-blob) transactions in a single block.
pub const MAX_PLAIN_MESSAGES: usize = 200;

/// The maximum number of pay-for-blobs messages in a single block.
pub const MAX_BLOB_MESSAGES: usize = 600;

/// The maximum wire size of a single transaction in bytes (2 MiB).
pub const MAX_TX_SIZE: usize = 2_097_152;

/// The fixed gas limit carried by the synthesized protocol-fee transaction.
/// Validators reject any proposal whose fee transaction deviates from this.
pub const FEE_FORWARD_GAS_LIMIT: u64 = 50_000;

/// The native staking and fee denomination of the Opal network.
pub const NATIVE_DENOM: &str = "uopal";

/// Domain tag prepended to a module name when deriving its account address.
pub const MODULE_ADDRESS_TAG: &[u8] = b"opal/module/";

/// The name of the module account that accrues protocol fees. Its balance
/// is forwarded to the block proposer by the protocol-fee transaction.
pub const FEE_MODULE_NAME: &str = "protocol_fee";

/// The name of the module account whose balance is burned each block.
/// Inbound transfers of non-native assets to this address are rejected.
pub const BURN_MODULE_NAME: &str = "burn";

/// Human-readable prefix of a displayed account address.
pub const ADDRESS_DISPLAY_PREFIX: &str = "opal1";
